//! Pinpoint Feedback Server
//!
//! Usage:
//! ```bash
//! # With config file
//! pinpoint-server --config config.yaml
//!
//! # Or with environment variables (env vars override config)
//! PINPOINT_PORT=8080 PINPOINT_DATABASE_PATH=./feedback.db pinpoint-server
//!
//! # Register a user and print their API token
//! pinpoint-server users add alice@example.com --name Alice
//! ```
//!
//! Test with:
//! ```bash
//! curl http://localhost:3000/api/feedback \
//!   -H "Content-Type: application/json" \
//!   -d '{
//!     "title": "Broken link",
//!     "description": "The pricing link returns 404",
//!     "path": "/pricing",
//!     "type": "bug",
//!     "sessionId": "3f0c9a4e-5d7b-4a61-9f1e-2b8c7d6e5a43"
//!   }'
//!
//! curl "http://localhost:3000/api/reports?sessionId=3f0c9a4e-5d7b-4a61-9f1e-2b8c7d6e5a43&format=json"
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use pinpoint_core::{FeedbackStore, User, token::generate_api_token, token::hash_api_token};
use pinpoint_observability::Metrics;
use pinpoint_server::{AppState, ServerConfig, api};
use pinpoint_store_sqlite::SqliteFeedbackStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Pinpoint Server - Website feedback collection
#[derive(Parser)]
#[command(name = "pinpoint-server")]
#[command(about = "Pinpoint server for collecting website feedback", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to configuration file (YAML or TOML)
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "PINPOINT_CONFIG",
        global = true
    )]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server (default)
    Serve,

    /// Manage registered users
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Register a user and print a new API token
    Add {
        /// Email address feedback is shared to
        email: String,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => ServerConfig::from_file(config_path)
            .with_context(|| format!("Failed to load configuration from {}", config_path))?,
        None => ServerConfig::default(),
    };

    // Merge environment variables (they override config file)
    config.merge_env();

    init_tracing(&config)?;

    if let Some(path) = &cli.config {
        info!("📁 Loaded configuration from: {}", path);
    }

    let db_path = config.database.expanded_path();
    info!("💾 Opening feedback database: {}", db_path.display());
    let store = SqliteFeedbackStore::new(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    match cli.command {
        Some(Commands::Users {
            command: UserCommands::Add { email, name },
        }) => {
            let result = add_user(&store, &email, name).await;
            store.close().await;
            result
        }
        Some(Commands::Serve) | None => serve(config, store).await,
    }
}

fn init_tracing(config: &ServerConfig) -> anyhow::Result<()> {
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Build EnvFilter with base level
    let mut filter = EnvFilter::new(format!("{}", log_level));

    // Keep sqlx query logs quiet unless explicitly requested
    if !config.logging.log_sql_queries {
        match "sqlx=warn".parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => eprintln!("Failed to set sqlx log filter: {}", e),
        }
    }

    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn add_user(
    store: &SqliteFeedbackStore,
    email: &str,
    name: Option<String>,
) -> anyhow::Result<()> {
    let user = User::new(email, name)?;
    let token = generate_api_token();
    store.insert_user(&user, &hash_api_token(&token)).await?;

    info!(user_id = %user.id, email = %user.email, "Registered user");
    println!("User:  {} ({})", user.email, user.id);
    println!("Token: {}", token);
    println!("The token is shown only once; store it somewhere safe.");
    Ok(())
}

async fn serve(config: ServerConfig, store: SqliteFeedbackStore) -> anyhow::Result<()> {
    info!("🚀 Initializing Pinpoint feedback server");

    let metrics = Arc::new(Metrics::new()?);
    let store: Arc<dyn FeedbackStore> = Arc::new(store);
    let state = AppState::new(store, metrics);

    if config.cors.allowed_origins.is_empty() {
        info!("🌐 CORS: any origin");
    } else {
        info!("🌐 CORS: {}", config.cors.allowed_origins.join(", "));
    }

    let app = api::router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;
    let listener = TcpListener::bind(addr).await?;

    info!("");
    info!("✅ Pinpoint listening on http://{}", addr);
    info!("   API endpoints:");
    info!("   - Submit feedback:   POST http://{}/api/feedback", addr);
    info!("   - Session feedback:  GET  http://{}/api/feedback?sessionId=", addr);
    info!("   - Session report:    GET  http://{}/api/reports?sessionId=", addr);
    info!("   - Share feedback:    POST http://{}/api/share", addr);
    info!("   Observability:");
    info!("   - Health check:       http://{}/healthz", addr);
    info!("   - Readiness check:    http://{}/readyz", addr);
    info!("   - Prometheus metrics: http://{}/metrics", addr);
    info!("");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

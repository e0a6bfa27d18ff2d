//! Pinpoint CLI
//!
//! Command-line client for submitting and reviewing website feedback

use anyhow::Context;
use clap::{Parser, Subcommand};
use pinpoint_cli::{ClientConfig, FeedbackClient, default_session_file, screenshot};
use pinpoint_core::{
    FeedbackKind, NewFeedback, ReportFormat, SessionIdentity, Severity, ShareRequest,
    document::{PageLayout, ReportDocument},
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pinpoint")]
#[command(about = "Pinpoint - Website feedback from the command line", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Pinpoint server URL
    #[arg(
        long,
        env = "PINPOINT_SERVER_URL",
        default_value = "http://localhost:3000",
        global = true
    )]
    server: String,

    /// API token of a registered user
    #[arg(long, env = "PINPOINT_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// File holding the session identity
    #[arg(long, value_name = "FILE", env = "PINPOINT_SESSION_FILE", global = true)]
    session_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or reset the feedback session
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },
    /// Submit feedback about a page
    Submit {
        /// Short summary
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,

        /// Page path the feedback refers to
        #[arg(long, default_value = "/")]
        path: String,

        /// bug, suggestion, content, improvement or other
        #[arg(short = 't', long = "type", default_value = "bug")]
        kind: String,

        /// low, medium, high or critical (server default: medium)
        #[arg(short, long)]
        severity: Option<String>,

        /// Image file to attach
        #[arg(long, value_name = "FILE")]
        screenshot: Option<PathBuf>,
    },
    /// List this session's feedback, newest first
    List,
    /// Fetch this session's report
    Report {
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Write the report to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Export this session's report as a paginated text document
    Export {
        /// Defaults to feedback-report-<session>.txt
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Share one of your feedback records with another user
    Share {
        feedback_id: String,

        /// Email of the registered user to share with
        email: String,

        /// Allow the recipient to edit
        #[arg(long)]
        can_edit: bool,
    },
}

#[derive(Subcommand)]
enum SessionCommands {
    /// Print the current session ID
    Show,
    /// Start a new session
    Reset,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let session_path = match &cli.session_file {
        Some(path) => PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).to_string()),
        None => default_session_file(),
    };
    let mut session = SessionIdentity::load_or_create(&session_path)
        .with_context(|| format!("Failed to load session from {}", session_path.display()))?;

    let client = FeedbackClient::new(ClientConfig::new(&cli.server).with_token(cli.token))?;

    match cli.command {
        Commands::Session { command } => match command {
            SessionCommands::Show => {
                println!("{}", session.session_id());
            }
            SessionCommands::Reset => {
                let session_id = session.reset()?;
                println!("Started new session {}", session_id);
            }
        },
        Commands::Submit {
            title,
            description,
            path,
            kind,
            severity,
            screenshot: screenshot_file,
        } => {
            // Validate locally before the round trip
            let kind = kind.parse::<FeedbackKind>()?;
            let severity = severity.map(|s| s.parse::<Severity>()).transpose()?;
            let screenshot = screenshot_file
                .as_deref()
                .map(screenshot::data_url_from_file)
                .transpose()?;

            let new = NewFeedback {
                title: Some(title),
                description: Some(description),
                path: Some(path),
                kind: Some(kind.to_string()),
                severity: severity.map(|s| s.to_string()),
                screenshot,
                session_id: Some(session.session_id().to_string()),
            };

            let feedback = client.submit(&new).await?;
            println!(
                "Submitted {} [{} / {}] {}",
                feedback.id, feedback.kind, feedback.severity, feedback.title
            );
        }
        Commands::List => {
            let items = client.list(session.session_id()).await?;
            if items.is_empty() {
                println!("No feedback in session {}", session.session_id());
            }
            for item in items {
                println!(
                    "{}  {:<11} {:<8} {:<24} {}",
                    item.created_at.format("%Y-%m-%d %H:%M"),
                    item.kind.as_str(),
                    item.severity.as_str(),
                    item.path,
                    item.title
                );
            }
        }
        Commands::Report { format, output } => {
            let format = format.parse::<ReportFormat>()?;
            let report = client.report(session.session_id(), format).await?;
            let json = serde_json::to_string_pretty(&report)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!(
                        "Wrote report with {} items to {}",
                        report.feedback_count,
                        path.display()
                    );
                }
                None => println!("{}", json),
            }
        }
        Commands::Export { output } => {
            let report = client
                .report(session.session_id(), ReportFormat::Json)
                .await?;
            let document = ReportDocument::layout(&report, &PageLayout::default());
            let path = output.unwrap_or_else(|| {
                PathBuf::from(format!("feedback-report-{}.txt", report.session_id))
            });
            std::fs::write(&path, document.render())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "Exported {} items on {} pages to {}",
                report.feedback_count,
                document.pages().len(),
                path.display()
            );
        }
        Commands::Share {
            feedback_id,
            email,
            can_edit,
        } => {
            let share = client
                .share(&ShareRequest {
                    feedback_id,
                    email,
                    can_edit,
                })
                .await?;
            println!(
                "Shared {} with user {}{}",
                share.feedback_id,
                share.shared_with_id,
                if share.can_edit { " (can edit)" } else { "" }
            );
        }
    }

    Ok(())
}

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub cors: CorsConfig,

    /// Largest accepted request body; screenshots travel inline as data URLs
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file (`~` is expanded)
    #[serde(default = "default_database_path")]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_false")]
    pub log_sql_queries: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed to call the API. Empty allows any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            cors: CorsConfig::default(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_sql_queries: false,
        }
    }
}

impl DatabaseConfig {
    /// Database path with `~` expanded
    pub fn expanded_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.path).to_string())
    }
}

impl ServerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents)?
        };

        Ok(config)
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        // Server settings
        if let Ok(val) = std::env::var("PINPOINT_HOST") {
            self.host = val;
        }

        if let Ok(val) = std::env::var("PINPOINT_PORT")
            && let Ok(port) = val.parse::<u16>()
        {
            self.port = port;
        }

        if let Ok(val) = std::env::var("PINPOINT_MAX_BODY_BYTES")
            && let Ok(limit) = val.parse::<usize>()
        {
            self.max_body_bytes = limit;
        }

        // Database
        if let Ok(val) = std::env::var("PINPOINT_DATABASE_PATH") {
            self.database.path = val;
        }

        // Logging settings
        if let Ok(val) = std::env::var("PINPOINT_LOG_LEVEL") {
            self.logging.level = val;
        }

        if let Ok(val) = std::env::var("PINPOINT_LOG_SQL_QUERIES")
            && let Ok(enabled) = val.parse::<bool>()
        {
            self.logging.log_sql_queries = enabled;
        }

        // Comma-separated origin list
        if let Ok(val) = std::env::var("PINPOINT_CORS_ORIGINS") {
            self.cors.allowed_origins = val
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect();
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_database_path() -> String {
    "~/.pinpoint/feedback.db".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_false() -> bool {
    false
}

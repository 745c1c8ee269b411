use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Environment (dev, staging, prod)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Longest accepted frame in bytes, delimiter excluded
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,

    /// Initial capacity of a connection's receive buffer
    #[serde(default = "default_read_buffer_bytes")]
    pub read_buffer_bytes: usize,

    /// Upper bound on a single send to a single session
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,

    /// Pause after a failed accept
    #[serde(default = "default_accept_backoff_ms")]
    pub accept_backoff_ms: u64,
}

impl Config {
    /// Load configuration from environment variables or app.env file
    pub fn load() -> Result<Self, ConfigError> {
        // Try to load from app.env file first
        if std::path::Path::new("app.env").exists() {
            dotenvy::from_filename("app.env").ok();
        } else {
            // Fallback to .env file
            dotenvy::dotenv().ok();
        }

        // Load from environment variables using envy
        Ok(envy::from_env::<Config>()?)
    }

    /// Get the full server address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    pub fn accept_backoff(&self) -> Duration {
        Duration::from_millis(self.accept_backoff_ms)
    }

    /// Default tracing filter when `RUST_LOG` is not set
    pub fn default_log_filter(&self) -> &'static str {
        if self.is_production() {
            "todo_hub=info,warn"
        } else {
            "todo_hub=debug,info"
        }
    }

    /// Check if running in development mode
    pub fn is_development(&self) -> bool {
        self.environment.to_lowercase() == "dev" || self.environment.to_lowercase() == "development"
    }

    /// Check if running in production mode
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "prod" || self.environment.to_lowercase() == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            max_frame_bytes: default_max_frame_bytes(),
            read_buffer_bytes: default_read_buffer_bytes(),
            send_timeout_ms: default_send_timeout_ms(),
            accept_backoff_ms: default_accept_backoff_ms(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvError(#[from] envy::Error),
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_max_frame_bytes() -> usize {
    1024 * 1024
}

fn default_read_buffer_bytes() -> usize {
    4096
}

fn default_send_timeout_ms() -> u64 {
    5_000
}

fn default_accept_backoff_ms() -> u64 {
    100
}

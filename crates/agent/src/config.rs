//! Agent configuration from environment variables.

use std::path::PathBuf;
use std::time::Duration;

/// Default tail poll interval in milliseconds.
const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Default database location, next to the working directory.
const DEFAULT_DATABASE_URL: &str = "sqlite://arenatrack.db";

/// Configuration problems that abort startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{0} must be {1}")]
    Invalid(&'static str, &'static str),
}

/// Daemon configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the client log file to follow.
    pub log_path: PathBuf,
    /// SQLite database URL for identities, decks, and the cursor.
    pub database_url: String,
    /// Bounded sleep between polls while waiting for new log bytes.
    pub poll_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Env Var            | Required | Default                  |
    /// |--------------------|----------|--------------------------|
    /// | `LOG_PATH`         | yes      | --                       |
    /// | `DATABASE_URL`     | no       | `sqlite://arenatrack.db` |
    /// | `POLL_INTERVAL_MS` | no       | `500`                    |
    pub fn from_env() -> Result<Self, ConfigError> {
        let log_path = std::env::var("LOG_PATH")
            .map(PathBuf::from)
            .map_err(|_| ConfigError::Missing("LOG_PATH"))?;

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let poll_interval_ms: u64 = match std::env::var("POLL_INTERVAL_MS") {
            Ok(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid("POLL_INTERVAL_MS", "a whole number of milliseconds"))?,
            Err(_) => DEFAULT_POLL_INTERVAL_MS,
        };

        Ok(Self {
            log_path,
            database_url,
            poll_interval: Duration::from_millis(poll_interval_ms),
        })
    }
}

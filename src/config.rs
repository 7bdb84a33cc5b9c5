//! Runtime configuration: database location, log filter and lock wait.
//!
//! Defaults can be overridden through `FLASHCARDS_DB`, `FLASHCARDS_LOG` and
//! `FLASHCARDS_BUSY_TIMEOUT_MS`; command-line flags override both.

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DATABASE: &str = "FLASHCARDS_DB";
pub const ENV_LOG: &str = "FLASHCARDS_LOG";
pub const ENV_BUSY_TIMEOUT_MS: &str = "FLASHCARDS_BUSY_TIMEOUT_MS";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub database_path: PathBuf,
    /// `env_logger` filter used when `RUST_LOG` is unset.
    pub log_level: String,
    /// How long a writer waits for a locked database before reporting a conflict.
    pub busy_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("db.sqlite3"),
            log_level: "info".to_string(),
            busy_timeout: Duration::from_millis(2000),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DATABASE) {
            config.database_path = PathBuf::from(path);
        }
        if let Some(level) = lookup(ENV_LOG) {
            config.log_level = level;
        }
        if let Some(raw) = lookup(ENV_BUSY_TIMEOUT_MS) {
            let ms = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| Error::Config(format!("{ENV_BUSY_TIMEOUT_MS}='{raw}': {e}")))?;
            config.busy_timeout = Duration::from_millis(ms);
        }

        Ok(config)
    }
}

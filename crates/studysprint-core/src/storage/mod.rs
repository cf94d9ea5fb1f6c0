mod config;
pub mod database;
mod session;
mod store;
mod streak;

pub use config::{Config, ReflectionConfig, TimerConfig, TimerOverrides, TimerSettings};
pub use database::Database;
pub use session::{PersistedState, Rating, Session, DEFAULT_GOAL};
pub use store::{SessionStore, Statistics, AVERAGE_PLACEHOLDER, STATE_KEY};
pub use streak::{is_following_day, update_streak};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the directory holding the database and config file.
///
/// `STUDYSPRINT_DATA_DIR` wins when set. Otherwise `~/.config/studysprint`,
/// or `~/.config/studysprint-dev` with `STUDYSPRINT_ENV=dev`.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("STUDYSPRINT_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("STUDYSPRINT_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("studysprint-dev")
            } else {
                base_dir.join("studysprint")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}

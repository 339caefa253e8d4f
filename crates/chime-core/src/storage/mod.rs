mod config;
pub mod history;

pub use config::{Config, NotificationSettings, PhaseSettings, SharedConfig, TimerSoundSettings};
pub use history::{SqliteHistory, Stats};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/chime[-dev]/` based on CHIME_ENV.
///
/// Set CHIME_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("CHIME_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("chime-dev")
    } else {
        base_dir.join("chime")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(e.to_string()))?;
    Ok(dir)
}

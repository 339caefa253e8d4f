//! TOML-based application configuration.
//!
//! Stores per-phase preferences:
//! - Phase durations
//! - Desktop / tab notification switches and the expiration sound
//! - The focus timer sound (ticking while a focus session runs)
//! - Long-break cadence
//!
//! Configuration is stored at `~/.config/chime/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use super::data_dir;
use crate::error::ConfigError;
use crate::timer::Phase;

/// Notification switches for the end of one phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default = "default_true")]
    pub desktop: bool,
    #[serde(default = "default_true")]
    pub tab: bool,
    /// Sound file played when the phase expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
}

/// Sound looped while a focus session is running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSoundSettings {
    pub file: String,
    #[serde(default = "default_bpm")]
    pub bpm: u32,
    #[serde(default = "default_volume")]
    pub volume: u32,
}

/// Settings for a single phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSettings {
    pub duration_min: u32,
    #[serde(default)]
    pub notifications: NotificationSettings,
    /// Only read for the focus phase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_sound: Option<TimerSoundSettings>,
}

impl PhaseSettings {
    fn with_duration(duration_min: u32) -> Self {
        Self {
            duration_min,
            notifications: NotificationSettings::default(),
            timer_sound: None,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.duration_min).saturating_mul(60))
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/chime/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Focus sessions between long breaks. 0 disables long breaks.
    #[serde(default = "default_long_break_interval")]
    pub long_break_interval: u32,
    #[serde(default = "default_focus")]
    pub focus: PhaseSettings,
    #[serde(default = "default_short_break")]
    pub short_break: PhaseSettings,
    #[serde(default = "default_long_break")]
    pub long_break: PhaseSettings,
}

// Default functions
fn default_true() -> bool {
    true
}
fn default_bpm() -> u32 {
    60
}
fn default_volume() -> u32 {
    50
}
fn default_long_break_interval() -> u32 {
    4
}
fn default_focus() -> PhaseSettings {
    PhaseSettings::with_duration(25)
}
fn default_short_break() -> PhaseSettings {
    PhaseSettings::with_duration(5)
}
fn default_long_break() -> PhaseSettings {
    PhaseSettings::with_duration(15)
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            desktop: true,
            tab: true,
            sound: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            long_break_interval: default_long_break_interval(),
            focus: default_focus(),
            short_break: default_short_break(),
            long_break: default_long_break(),
        }
    }
}

impl Config {
    /// Settings of the given phase.
    pub fn phase(&self, phase: Phase) -> &PhaseSettings {
        match phase {
            Phase::Focus => &self.focus,
            Phase::ShortBreak => &self.short_break,
            Phase::LongBreak => &self.long_break,
        }
    }

    /// Whether a long-break cadence is configured.
    pub fn has_long_break(&self) -> bool {
        self.long_break_interval > 0
    }

    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let new_value = match obj.get(part) {
                Some(serde_json::Value::Bool(_)) => serde_json::Value::Bool(
                    value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                ),
                Some(serde_json::Value::Number(_)) => serde_json::Value::Number(
                    value
                        .parse::<u64>()
                        .map_err(|e| invalid(e.to_string()))?
                        .into(),
                ),
                Some(serde_json::Value::Object(_)) | Some(serde_json::Value::Array(_)) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                Some(_) => serde_json::Value::String(value.into()),
                // Optional fields are omitted when unset; only strings can be introduced.
                None if matches!(part, "sound") => serde_json::Value::String(value.into()),
                None if matches!(part, "timer_sound") => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                None => return Err(unknown()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Default location of the config file.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file does not exist.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or the default
    /// config cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(err) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: err.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. Does not persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// into the field's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

/// Config shared between the timer and its observers.
///
/// Readers take a snapshot; a timer `Change` event follows every update.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig(Arc<RwLock<Config>>);

impl SharedConfig {
    pub fn new(config: Config) -> Self {
        Self(Arc::new(RwLock::new(config)))
    }

    pub fn snapshot(&self) -> Config {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn replace(&self, config: Config) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = config;
    }
}

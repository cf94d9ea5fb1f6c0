//! TOML-based application configuration.
//!
//! Stores:
//! - Sprint and break durations (fractional minutes)
//! - Idle-hint threshold and tick resolution
//! - Reflection rating scale
//!
//! Configuration is stored at `<data_dir>/config.toml`. Durations can be
//! overridden at startup without touching the file, see [`TimerOverrides`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::ConfigError;

/// Timer-specific configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_sprint_minutes")]
    pub sprint_minutes: f64,
    #[serde(default = "default_break_minutes")]
    pub break_minutes: f64,
    #[serde(default = "default_idle_threshold_ms")]
    pub idle_threshold_ms: u64,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

/// Reflection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectionConfig {
    /// Highest selectable rating; ratings run from 1.
    #[serde(default = "default_rating_scale")]
    pub rating_scale: u8,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub reflection: ReflectionConfig,
}

/// Startup overrides (command line or environment). `None` keeps the file value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimerOverrides {
    pub sprint_minutes: Option<f64>,
    pub break_minutes: Option<f64>,
    pub idle_threshold_ms: Option<u64>,
}

/// Resolved values the controller runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSettings {
    pub sprint_ms: u64,
    pub break_ms: u64,
    pub idle_threshold_ms: u64,
    pub tick_interval: Duration,
    pub rating_scale: u8,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Config::default().timer_settings()
    }
}

// Default functions
fn default_sprint_minutes() -> f64 {
    25.0
}
fn default_break_minutes() -> f64 {
    5.0
}
fn default_idle_threshold_ms() -> u64 {
    12_000
}
fn default_tick_interval_ms() -> u64 {
    1_000
}
fn default_rating_scale() -> u8 {
    5
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            sprint_minutes: default_sprint_minutes(),
            break_minutes: default_break_minutes(),
            idle_threshold_ms: default_idle_threshold_ms(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Default for ReflectionConfig {
    fn default() -> Self {
        Self {
            rating_scale: default_rating_scale(),
        }
    }
}

fn minutes_to_ms(minutes: f64) -> u64 {
    (minutes * 60_000.0).round() as u64
}

impl Config {
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
        if parts.peek().is_none() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("not a leaf value".to_string()));
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Location of the config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                tracing::debug!(path = %path.display(), "wrote default configuration");
                Ok(cfg)
            }
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
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

    /// Set a value by dot-separated key, in memory only.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value is rejected.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check ranges the type system does not.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_minutes("timer.sprint_minutes", self.timer.sprint_minutes)?;
        check_minutes("timer.break_minutes", self.timer.break_minutes)?;
        if self.timer.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timer.tick_interval_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        if !(2..=10).contains(&self.reflection.rating_scale) {
            return Err(ConfigError::InvalidValue {
                key: "reflection.rating_scale".into(),
                message: "must be between 2 and 10".into(),
            });
        }
        Ok(())
    }

    /// Apply startup overrides on top of the loaded values.
    pub fn apply_overrides(&mut self, overrides: TimerOverrides) -> Result<(), ConfigError> {
        if let Some(minutes) = overrides.sprint_minutes {
            check_minutes("sprint_minutes", minutes)?;
            self.timer.sprint_minutes = minutes;
        }
        if let Some(minutes) = overrides.break_minutes {
            check_minutes("break_minutes", minutes)?;
            self.timer.break_minutes = minutes;
        }
        if let Some(ms) = overrides.idle_threshold_ms {
            self.timer.idle_threshold_ms = ms;
        }
        Ok(())
    }

    pub fn timer_settings(&self) -> TimerSettings {
        TimerSettings {
            sprint_ms: minutes_to_ms(self.timer.sprint_minutes),
            break_ms: minutes_to_ms(self.timer.break_minutes),
            idle_threshold_ms: self.timer.idle_threshold_ms,
            tick_interval: Duration::from_millis(self.timer.tick_interval_ms.max(1)),
            rating_scale: self.reflection.rating_scale,
        }
    }
}

fn check_minutes(key: &str, minutes: f64) -> Result<(), ConfigError> {
    if minutes.is_finite() && minutes > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{minutes} is not a positive number of minutes"),
        })
    }
}

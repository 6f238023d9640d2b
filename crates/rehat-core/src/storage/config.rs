//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Alarm cadence, snooze length and quick presets
//! - The audio player command and where the alarm sounds live
//! - Commit-count query settings and the tip list
//! - Desktop notification toggle
//!
//! Configuration is stored at `~/.config/rehat/config.toml`. The persisted
//! runtime state (armed alarm, sound choice, break counts) is not config; it
//! lives in the kv store.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;
use crate::sound::PlayerCommand;

/// Alarm behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmConfig {
    #[serde(default = "default_snooze_minutes")]
    pub snooze_minutes: u32,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Quick presets offered by the UI, in minutes from now.
    #[serde(default = "default_presets")]
    pub presets: Vec<u32>,
}

/// Sound playback configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SoundConfig {
    /// Player command line, e.g. `"paplay"` or `"aplay -q"`. `{file}` marks
    /// where the sound path goes. Platform default when unset.
    #[serde(default)]
    pub player: Option<String>,
    /// Directory holding `alarm1.wav` .. `alarm3.wav`.
    #[serde(default)]
    pub sounds_dir: Option<PathBuf>,
}

/// Daily stats configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Repository the commit count is taken from. Current directory when unset.
    #[serde(default)]
    pub project_dir: Option<PathBuf>,
    #[serde(default = "default_commit_query_timeout_ms")]
    pub commit_query_timeout_ms: u64,
    /// How long a commit count is reused before asking git again.
    #[serde(default = "default_commit_cache_secs")]
    pub commit_cache_secs: u64,
    /// Replaces the built-in tips when non-empty.
    #[serde(default)]
    pub tips: Vec<String>,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub desktop: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/rehat/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub alarm: AlarmConfig,
    #[serde(default)]
    pub sound: SoundConfig,
    #[serde(default)]
    pub stats: StatsConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

// Default functions
fn default_snooze_minutes() -> u32 {
    5
}
fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_presets() -> Vec<u32> {
    vec![5, 15, 30, 60]
}
fn default_commit_query_timeout_ms() -> u64 {
    2000
}
fn default_commit_cache_secs() -> u64 {
    30
}
fn default_true() -> bool {
    true
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            snooze_minutes: default_snooze_minutes(),
            tick_interval_ms: default_tick_interval_ms(),
            presets: default_presets(),
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            project_dir: None,
            commit_query_timeout_ms: default_commit_query_timeout_ms(),
            commit_cache_secs: default_commit_cache_secs(),
            tips: Vec::new(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { desktop: true }
    }
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
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    // Optional fields are null until set; an empty string unsets them.
                    serde_json::Value::Null if value.is_empty() => serde_json::Value::Null,
                    serde_json::Value::Object(_) => return Err(unknown()),
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        data_dir()
            .map(|d| d.join("config.toml"))
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from("~/.config/rehat"),
                message: e.to_string(),
            })
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing the defaults there when missing.
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
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

    /// Set a config value by key in memory. Returns error if key is unknown
    /// or the value does not fit the field.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Reject values the scheduler cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };
        if self.alarm.snooze_minutes == 0 {
            return Err(invalid("alarm.snooze_minutes", "must be at least 1"));
        }
        if self.alarm.tick_interval_ms == 0 {
            return Err(invalid("alarm.tick_interval_ms", "must be at least 1"));
        }
        if self.alarm.presets.iter().any(|&m| m == 0) {
            return Err(invalid("alarm.presets", "presets must be positive minutes"));
        }
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Directory the alarm sounds are read from.
    pub fn sounds_dir(&self) -> PathBuf {
        self.sound.sounds_dir.clone().unwrap_or_else(|| {
            data_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join("sounds")
        })
    }

    pub fn player_command(&self) -> PlayerCommand {
        self.sound
            .player
            .as_deref()
            .and_then(PlayerCommand::parse)
            .unwrap_or_else(PlayerCommand::platform_default)
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.alarm.tick_interval_ms.max(1))
    }
}

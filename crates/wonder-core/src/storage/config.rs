//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Notification behavior (enabled, badge, sound)
//! - Morning ritual defaults (hour, minute, weekly reflection)
//!
//! Configuration is stored at `~/.config/wonder/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::data_dir;

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub badge: bool,
    /// Silent by design; opt in to sound explicitly.
    #[serde(default)]
    pub sound: bool,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            badge: true,
            sound: false,
        }
    }
}

/// Morning ritual configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RitualSection {
    #[serde(default = "default_hour")]
    pub default_hour: u32,
    #[serde(default)]
    pub default_minute: u32,
    #[serde(default = "default_true")]
    pub weekly_reflection: bool,
}

impl Default for RitualSection {
    fn default() -> Self {
        Self {
            default_hour: 6,
            default_minute: 0,
            weekly_reflection: true,
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/wonder/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub ritual: RitualSection,
}

fn default_true() -> bool {
    true
}

fn default_hour() -> u32 {
    6
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/wonder"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load the configuration, falling back to defaults when the file does
    /// not exist yet.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from a specific path (for tests).
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Save the configuration.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Save to a specific path (for tests).
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, raw).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

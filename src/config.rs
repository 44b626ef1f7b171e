//! Configuration types for the delivery bot.
//!
//! Settings resolve in three layers: built-in defaults, then an optional
//! TOML config file, then environment variable overrides. The env var names
//! match the deployment convention the bot has always used (`FILE_ID`,
//! `DOWNLOAD_FOLDER`, `FILE`). Secrets are handled separately in
//! [`crate::credentials`] and never appear in the config file.

use crate::error::DeliveryError;
use crate::scheduler::Schedule;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// Environment variable overriding `drive.file_id`.
pub const FILE_ID_VAR: &str = "FILE_ID";

/// Environment variable overriding `drive.download_dir`.
pub const DOWNLOAD_DIR_VAR: &str = "DOWNLOAD_FOLDER";

/// Environment variable overriding `drive.file_name`.
pub const FILE_NAME_VAR: &str = "FILE";

/// Environment variable pointing at an alternate config file path.
pub const CONFIG_PATH_VAR: &str = "DRIVECAST_CONFIG";

/// Top-level configuration for the bot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Telegram polling settings.
    pub telegram: TelegramConfig,
    /// Google Drive fetch settings.
    pub drive: DriveConfig,
    /// Redelivery settings.
    pub delivery: DeliveryConfig,
}

/// Telegram long-poll configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Long-poll timeout in seconds passed to `getUpdates` (1-3600).
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            poll_timeout_secs: 120,
        }
    }
}

/// Google Drive fetch configuration.
///
/// All three fields are required; [`BotConfig::validate`] rejects a config
/// that leaves any of them empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Drive file ID fetched once at startup.
    pub file_id: String,
    /// Local directory the file is stored in (created if missing).
    pub download_dir: PathBuf,
    /// Local file name; also the name the chat sees on each upload.
    pub file_name: String,
}

/// Redelivery configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// When the file is re-sent to the active chat.
    pub schedule: Schedule,
}

impl BotConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| DeliveryError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| DeliveryError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/drivecast/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("drivecast").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("drivecast")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/drivecast-config/config.toml")
        }
    }

    /// Resolve the effective configuration.
    ///
    /// Starts from defaults, merges the config file if one exists at
    /// `DRIVECAST_CONFIG` (or the default path), then applies env overrides.
    /// When no file exists, a starter config is written to that path for
    /// the operator to fill in (best effort; env-only deployments may have
    /// nowhere writable).
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed.
    pub fn load() -> crate::error::Result<Self> {
        let path = match std::env::var_os(CONFIG_PATH_VAR) {
            Some(p) => PathBuf::from(p),
            None => Self::default_config_path(),
        };

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            let starter = Self::default();
            match starter.save_to_file(&path) {
                Ok(()) => info!("wrote starter config to {}", path.display()),
                Err(e) => warn!("could not write starter config to {}: {e}", path.display()),
            }
            starter
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Overlay the drive options from the environment, when set and non-blank.
    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = env_override(FILE_ID_VAR) {
            self.drive.file_id = v;
        }
        if let Some(v) = env_override(DOWNLOAD_DIR_VAR) {
            self.drive.download_dir = PathBuf::from(v);
        }
        if let Some(v) = env_override(FILE_NAME_VAR) {
            self.drive.file_name = v;
        }
    }

    /// Validate that every required option is present and sane.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Config`] naming the offending option.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.drive.file_id.trim().is_empty() {
            return Err(DeliveryError::Config(format!(
                "drive.file_id is required (set {FILE_ID_VAR} or the config file)"
            )));
        }
        if self.drive.download_dir.as_os_str().is_empty() {
            return Err(DeliveryError::Config(format!(
                "drive.download_dir is required (set {DOWNLOAD_DIR_VAR} or the config file)"
            )));
        }
        if self.drive.file_name.trim().is_empty() {
            return Err(DeliveryError::Config(format!(
                "drive.file_name is required (set {FILE_NAME_VAR} or the config file)"
            )));
        }

        if !(1..=3600).contains(&self.telegram.poll_timeout_secs) {
            return Err(DeliveryError::Config(format!(
                "telegram.poll_timeout_secs must be between 1 and 3600, got {}",
                self.telegram.poll_timeout_secs
            )));
        }

        match self.delivery.schedule {
            Schedule::Interval { secs } => {
                if secs == 0 {
                    return Err(DeliveryError::Config(
                        "delivery.schedule interval must be at least 1 second".to_owned(),
                    ));
                }
            }
            Schedule::Daily { hour, min } => {
                if hour > 23 || min > 59 {
                    return Err(DeliveryError::Config(format!(
                        "delivery.schedule daily time {hour:02}:{min:02} is out of range"
                    )));
                }
            }
        }

        Ok(())
    }
}

fn env_override(var: &str) -> Option<String> {
    match std::env::var(var) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

//! Configuration file support for Bump.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/bump/config.toml`.
//! The kick target, auto-save delay, and reminder offsets live here so
//! the business rules are named, testable, and overridable rather than
//! buried in session and form logic.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub tracking: TrackingConfig,

    #[serde(default)]
    pub reminders: ReminderConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Movement counting parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Kick count at which a session auto-completes.
    #[serde(default = "default_kick_target")]
    pub kick_target: u32,

    /// Seconds between auto-completion and the automatic save.
    #[serde(default = "default_auto_save_delay_seconds")]
    pub auto_save_delay_seconds: u64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            kick_target: default_kick_target(),
            auto_save_delay_seconds: default_auto_save_delay_seconds(),
        }
    }
}

/// Checkup reminder policy
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Minutes before a checkup at which reminders fire.
    #[serde(default = "default_reminder_offsets")]
    pub offsets_minutes: Vec<u32>,

    /// Lookahead window for the "upcoming checkups" view.
    #[serde(default = "default_upcoming_window_hours")]
    pub upcoming_window_hours: i64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            offsets_minutes: default_reminder_offsets(),
            upcoming_window_hours: default_upcoming_window_hours(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("bump")
}

fn default_kick_target() -> u32 {
    10
}

fn default_auto_save_delay_seconds() -> u64 {
    2
}

fn default_reminder_offsets() -> Vec<u32> {
    // One day and three hours before the appointment.
    vec![1440, 180]
}

fn default_upcoming_window_hours() -> i64 {
    24
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("bump").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.tracking.kick_target, 10);
        assert_eq!(config.tracking.auto_save_delay_seconds, 2);
        assert_eq!(config.reminders.offsets_minutes, vec![1440, 180]);
        assert_eq!(config.reminders.upcoming_window_hours, 24);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.tracking.kick_target, parsed.tracking.kick_target);
        assert_eq!(
            config.reminders.offsets_minutes,
            parsed.reminders.offsets_minutes
        );
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[tracking]
kick_target = 12
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.tracking.kick_target, 12);
        assert_eq!(config.tracking.auto_save_delay_seconds, 2); // default
        assert_eq!(config.reminders.offsets_minutes, vec![1440, 180]); // default
    }
}

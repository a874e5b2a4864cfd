//! Persisted dashboard configuration.
//!
//! One TOML file under the platform config directory holds the broker
//! settings and the last username the operator connected with. A missing
//! or unreadable file falls back to defaults; a default file is written
//! on first save so the operator has something to edit.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::mqtt::config::MqttConfig;

const CONFIG_DIR: &str = "auralight-dashboard";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no config directory available on this platform")]
    NoConfigDir,
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub mqtt: MqttConfig,
    /// Prefilled into the username box on startup.
    #[serde(default)]
    pub last_username: String,
}

impl DashboardConfig {
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Loads the config file, falling back to defaults when it does not
    /// exist yet. Parse failures are surfaced; a broken file should be
    /// fixed, not silently replaced.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(DashboardConfig::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        debug!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Best-effort load for startup: a bad file logs a warning and the
    /// dashboard starts with defaults instead of refusing to launch.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "config unusable, starting with defaults");
                DashboardConfig::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let config = DashboardConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: DashboardConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let parsed: DashboardConfig =
            toml::from_str("last_username = \"alice\"").unwrap();
        assert_eq!(parsed.last_username, "alice");
        assert_eq!(parsed.mqtt, MqttConfig::default());
    }
}

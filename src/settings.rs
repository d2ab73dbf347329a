//! Persistent receiver settings
//!
//! Saves and loads connection and scene-probe preferences (endpoint, reconnect
//! cadence, floor object names, event log location) to/from a
//! receiver_settings.json file in the config directory.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::constants::*;

/// Path to the settings file
pub const SETTINGS_FILE: &str = "config/receiver_settings.json";

/// Failure while reading or writing a config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    Missing(String),
    #[error("failed to access config file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Read a JSON config file into `T`
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::Missing(path.display().to_string()));
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Write `value` as pretty JSON, creating the parent directory if needed
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(value)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json)?;
    Ok(())
}

/// Settings that survive between sessions
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverSettings {
    /// WebSocket endpoint of the tracker
    pub endpoint: String,
    /// Seconds between reconnect checks
    pub reconnect_interval: f32,
    /// Scene object names probed (in order) for the floor height
    pub floor_names: Vec<String>,
    /// Floor height used when no floor object is found
    pub floor_fallback: f32,
    /// Write the session event log
    pub event_log_enabled: bool,
    /// Directory for session event logs
    pub log_dir: String,
}

impl Default for ReceiverSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            reconnect_interval: RECONNECT_INTERVAL,
            floor_names: FLOOR_NAMES.iter().map(|name| name.to_string()).collect(),
            floor_fallback: FLOOR_FALLBACK_HEIGHT,
            event_log_enabled: true,
            log_dir: "logs".to_string(),
        }
    }
}

impl ReceiverSettings {
    /// Load settings from file, or return defaults if the file is missing or invalid
    pub fn load() -> Self {
        Self::load_from(Path::new(SETTINGS_FILE))
    }

    pub fn load_from(path: &Path) -> Self {
        match read_json::<Self>(path) {
            Ok(settings) => {
                info!("Loaded settings from {}", path.display());
                settings
            }
            Err(ConfigError::Missing(_)) => {
                info!("No {} found, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("{}, using default settings", e);
                Self::default()
            }
        }
    }

    /// Save settings to file
    pub fn save(&self) -> Result<(), ConfigError> {
        write_json(Path::new(SETTINGS_FILE), self)?;
        info!("Saved settings to {}", SETTINGS_FILE);
        Ok(())
    }

    /// Apply command-line overrides (`--endpoint <url>`, `--no-log`)
    pub fn apply_args(&mut self, args: &[String]) {
        if let Some(endpoint) = args
            .iter()
            .position(|a| a == "--endpoint")
            .and_then(|i| args.get(i + 1))
        {
            self.endpoint = endpoint.clone();
        }
        if args.iter().any(|a| a == "--no-log") {
            self.event_log_enabled = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings: ReceiverSettings =
            serde_json::from_str(r#"{"endpoint": "ws://10.0.0.2:9000"}"#).unwrap();
        assert_eq!(settings.endpoint, "ws://10.0.0.2:9000");
        assert_eq!(settings.reconnect_interval, RECONNECT_INTERVAL);
        assert_eq!(settings.floor_names, vec!["floor", "Ground"]);
    }

    #[test]
    fn test_args_override_endpoint() {
        let mut settings = ReceiverSettings::default();
        let args: Vec<String> = ["ballsync", "--endpoint", "ws://host:1", "--no-log"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        settings.apply_args(&args);
        assert_eq!(settings.endpoint, "ws://host:1");
        assert!(!settings.event_log_enabled);
    }

    #[test]
    fn test_missing_file_reports_missing() {
        let result = read_json::<ReceiverSettings>(Path::new("config/does_not_exist.json"));
        assert!(matches!(result, Err(ConfigError::Missing(_))));
    }
}

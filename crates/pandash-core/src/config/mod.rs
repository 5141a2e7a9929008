//! Configuration management for Pandash.
//!
//! This module handles loading, saving, and managing Pandash configuration.
//! Backend-owned settings (throttle, workers, refresh interval) live on the
//! server and are handled by [`crate::settings`]; this file only holds what
//! the client needs before it can talk to the server.
//!
//! ## Configuration File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/pandash/config.toml` |
//! | macOS | `~/Library/Application Support/com.pandash.Pandash/config.toml` |
//! | Windows | `%APPDATA%\Pandash\Pandash\config\config.toml` |
//!
//! ## Example
//!
//! ```rust,ignore
//! use pandash_core::config::Config;
//!
//! let config = Config::load()?;
//! println!("Server: {}", config.server.base_url);
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration struct for Pandash.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend connection settings
    pub server: ServerConfig,
    /// Dashboard settings
    pub ui: UiConfig,
    /// CSV export settings
    pub export: ExportConfig,
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the backend, without a trailing `/api`
    pub base_url: String,
    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: crate::DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Dashboard settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Color theme ("dark" or "light")
    pub theme: String,
    /// Tab shown after login
    pub default_tab: String,
    /// Whether the queue tab polls on its own
    pub auto_refresh: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            default_tab: "browse".to_string(),
            auto_refresh: true,
        }
    }
}

/// CSV export settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory exports are written to (current directory when unset)
    pub directory: Option<PathBuf>,
}

impl ExportConfig {
    /// Directory exports should be written to.
    #[must_use]
    pub fn resolve_directory(&self) -> PathBuf {
        self.directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// If the configuration file doesn't exist, returns the default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to the default location.
    ///
    /// Creates the configuration directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::ConfigError(format!("Failed to create config directory: {e}"))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| Error::ConfigError(format!("Failed to write config: {e}")))
    }

    /// Get the default configuration directory path.
    #[must_use]
    pub fn config_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "pandash", "Pandash")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the directory holding per-user session data.
    #[must_use]
    pub fn data_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "pandash", "Pandash")
            .map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Get the full path to the configuration file.
    #[must_use]
    pub fn config_path() -> PathBuf {
        Self::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }
}

mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{}s", duration.as_secs()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.strip_suffix("ms")
            .map(|millis| {
                millis
                    .parse()
                    .map(Duration::from_millis)
                    .map_err(serde::de::Error::custom)
            })
            .or_else(|| {
                s.strip_suffix('s').map(|secs| {
                    secs.parse()
                        .map(Duration::from_secs)
                        .map_err(serde::de::Error::custom)
                })
            })
            .or_else(|| {
                s.strip_suffix('m').map(|mins| {
                    mins.parse::<u64>()
                        .map(|m| Duration::from_secs(m * 60))
                        .map_err(serde::de::Error::custom)
                })
            })
            .unwrap_or_else(|| Err(serde::de::Error::custom("invalid duration format")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.server.base_url, crate::DEFAULT_BASE_URL);
        assert_eq!(config.server.timeout, Duration::from_secs(15));
        assert_eq!(config.ui.default_tab, "browse");
        assert!(config.ui.auto_refresh);
        assert!(config.export.directory.is_none());
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut original = Config::default();
        original.server.base_url = "http://10.0.0.2:8080".to_string();
        original.ui.theme = "light".to_string();
        original.export.directory = Some(temp_dir.path().to_path_buf());
        original.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded.server.base_url, "http://10.0.0.2:8080");
        assert_eq!(loaded.ui.theme, "light");
        assert_eq!(loaded.export.directory.as_deref(), Some(temp_dir.path()));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = Config::load_from(&temp_dir.path().join("absent.toml")).expect("load");
        assert_eq!(loaded.server.base_url, crate::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_config_deserialization_partial() {
        let partial_toml = r#"
[server]
timeout = "30s"

[ui]
default_tab = "queue"
"#;

        let config: Config = toml::from_str(partial_toml).expect("parse partial config");

        assert_eq!(config.server.timeout, Duration::from_secs(30));
        assert_eq!(config.server.base_url, crate::DEFAULT_BASE_URL);
        assert_eq!(config.ui.default_tab, "queue");
        assert_eq!(config.ui.theme, "dark");
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "server = 3").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_humantime_variants() {
        let config: Config = toml::from_str("[server]\ntimeout = \"2m\"").unwrap();
        assert_eq!(config.server.timeout, Duration::from_secs(120));

        let config: Config = toml::from_str("[server]\ntimeout = \"750ms\"").unwrap();
        assert_eq!(config.server.timeout, Duration::from_millis(750));

        assert!(toml::from_str::<Config>("[server]\ntimeout = \"soon\"").is_err());
    }

    #[test]
    fn test_config_path() {
        let path = Config::config_path();
        assert!(path.ends_with("config.toml"));
    }
}

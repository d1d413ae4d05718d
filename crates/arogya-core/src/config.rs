//! Configuration management for arogya.
//!
//! Loads configuration from ${AROGYA_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub mod paths {
    //! Path resolution for arogya configuration.
    //!
    //! AROGYA_HOME resolution order:
    //! 1. AROGYA_HOME environment variable (if set)
    //! 2. ~/.config/arogya (default)

    use std::path::PathBuf;

    /// Returns the arogya home directory.
    ///
    /// Checks AROGYA_HOME env var first, falls back to ~/.config/arogya
    pub fn arogya_home() -> PathBuf {
        if let Ok(home) = std::env::var("AROGYA_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("arogya"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        arogya_home().join("config.toml")
    }
}

/// Backend connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the assistant backend.
    pub base_url: String,
    /// Request timeout in seconds (0 disables).
    pub request_timeout_secs: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: Config::DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: Config::DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Stable user identifier supplied by the identity provider.
    /// Overridable per-invocation with `--user`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Response language code, or "auto" for backend detection.
    pub language: String,

    /// Backend connection settings.
    #[serde(default)]
    pub backend: BackendConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_id: None,
            language: "auto".to_string(),
            backend: BackendConfig::default(),
        }
    }
}

impl Config {
    const DEFAULT_BASE_URL: &str = "http://localhost:8000";
    const DEFAULT_REQUEST_TIMEOUT_SECS: u32 = 30;

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let contents =
            toml::to_string_pretty(&Config::default()).context("Failed to serialize defaults")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        if self.backend.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(u64::from(
                self.backend.request_timeout_secs,
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_file_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(config.language, "auto");
        assert!(config.user_id.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "user_id = \"u1\"\n[backend]\nbase_url = \"http://api.test\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.user_id.as_deref(), Some("u1"));
        assert_eq!(config.backend.base_url, "http://api.test");
        // Unspecified fields keep their defaults
        assert_eq!(config.backend.request_timeout_secs, 30);
        assert_eq!(config.language, "auto");
    }

    #[test]
    fn test_zero_timeout_disables() {
        let config = Config {
            backend: BackendConfig {
                request_timeout_secs: 0,
                ..BackendConfig::default()
            },
            ..Config::default()
        };
        assert!(config.request_timeout().is_none());
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        Config::init(&path).unwrap();
        assert!(Config::init(&path).is_err());
    }
}

//! Configuration types.
//!
//! The plugin reads an optional TOML file; every field has a default so a
//! missing or partial file still yields a working configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Plugin configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Host connection settings.
    #[serde(default)]
    pub host: HostConfig,

    /// Icon resolution settings.
    #[serde(default)]
    pub icons: IconConfig,
}

/// Host connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Websocket endpoint of the launcher host.
    pub url: String,

    /// Reconnect attempts before giving up. Resets after a successful
    /// connection.
    pub max_reconnect_attempts: u32,

    /// Base delay for exponential reconnect backoff, in milliseconds.
    pub reconnect_base_delay_ms: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:4040".to_string(),
            max_reconnect_attempts: 5,
            reconnect_base_delay_ms: 500,
        }
    }
}

/// Icon resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    /// Pixel size for rendered icon caches (macOS).
    pub size: u32,

    /// Override for the icon cache directory.
    pub cache_dir: Option<PathBuf>,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            size: 64,
            cache_dir: None,
        }
    }
}

impl PluginConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from the default location, falling back to defaults when the
    /// file does not exist.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Effective icon cache directory: the configured override, or the
    /// per-plugin cache location.
    pub fn icon_cache_dir(&self) -> Option<PathBuf> {
        self.icons.cache_dir.clone().or_else(icon_cache_dir)
    }
}

/// Path to the plugin config file.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("glint/applications.toml"))
}

/// Default per-plugin icon cache directory.
pub fn icon_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|p| p.join("glint/applications/icons"))
}

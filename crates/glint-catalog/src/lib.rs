//! Application discovery and icon resolution.
//!
//! This crate builds the entry list the Applications plugin serves:
//! - `IconResolver` - ordered probe of icon directories and formats
//! - `LinuxCatalogBuilder` - `.desktop` file enumeration and parsing
//! - `MacCatalogBuilder` - application bundle walk with icon cache
//! - `CatalogService` - platform dispatcher

mod icons;
mod launch;
mod linux;
mod macos;
mod render;

pub use icons::IconResolver;
pub use launch::{AppLauncher, SystemLauncher};
pub use linux::LinuxCatalogBuilder;
pub use macos::MacCatalogBuilder;
pub use render::{IconRenderer, SipsIconRenderer};

use std::path::PathBuf;
use std::sync::Arc;

use glint_core::{Entry, PluginConfig};

/// Platform dispatcher for catalog builds.
///
/// No caching across calls; callers decide when to rebuild.
pub struct CatalogService {
    icon_size: u32,
    cache_dir: Option<PathBuf>,
}

impl CatalogService {
    /// Create a service from the plugin configuration.
    pub fn new(config: &PluginConfig) -> Self {
        Self {
            icon_size: config.icons.size,
            cache_dir: config.icon_cache_dir(),
        }
    }

    /// Build the entry list for the current platform.
    pub async fn build(&self) -> Vec<Entry> {
        let launcher: Arc<dyn AppLauncher> = Arc::new(SystemLauncher);

        if std::env::consts::OS == "macos" {
            let cache_dir = self
                .cache_dir
                .clone()
                .unwrap_or_else(|| std::env::temp_dir().join("glint-icons"));
            MacCatalogBuilder::new(launcher, Arc::new(SipsIconRenderer), cache_dir, self.icon_size)
                .build()
                .await
        } else {
            LinuxCatalogBuilder::new(launcher).build().await
        }
    }
}

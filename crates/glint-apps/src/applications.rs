//! The Applications plugin: serves the installed-application catalog.

use async_trait::async_trait;

use glint_catalog::CatalogService;
use glint_core::{Entry, PluginConfig};
use glint_plugin::Plugin;

/// Serves installed applications as launchable entries.
///
/// The catalog is built once at startup; a restart picks up newly
/// installed applications.
pub struct ApplicationsPlugin {
    entries: Vec<Entry>,
}

impl ApplicationsPlugin {
    /// Discover installed applications for the current platform.
    pub async fn discover(config: &PluginConfig) -> Self {
        let entries = CatalogService::new(config).build().await;
        tracing::info!("Discovered {} applications", entries.len());
        Self { entries }
    }
}

#[async_trait]
impl Plugin for ApplicationsPlugin {
    fn name(&self) -> &str {
        "Applications"
    }

    async fn on_query(&self, query: &str) -> Vec<Entry> {
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}

//! Entry point for the Applications plugin binary.

mod applications;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use applications::ApplicationsPlugin;
use glint_core::PluginConfig;
use glint_plugin::ProtocolEngine;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match PluginConfig::load_or_default() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Ignoring unreadable config: {}", e);
            PluginConfig::default()
        }
    };

    let plugin = Arc::new(ApplicationsPlugin::discover(&config).await);
    let engine = ProtocolEngine::new(plugin, config.host.clone());

    if let Err(e) = engine.run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

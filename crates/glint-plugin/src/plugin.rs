//! The plugin trait.

use async_trait::async_trait;
use glint_core::Entry;

/// A concrete plugin served to the host by a [`crate::ProtocolEngine`].
///
/// The engine calls `on_query` for every top-level query; follow-up
/// behavior is carried by the callbacks attached to the returned entries.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Plugin name, used for logging.
    fn name(&self) -> &str;

    /// Handle a top-level query and return the entries to display, in order.
    async fn on_query(&self, query: &str) -> Vec<Entry>;
}

//! Callback Registry
//!
//! Maps opaque wire identifiers to the live action/query callbacks of the
//! most recent response tree. The registry is the sole owner of the
//! callbacks; entries crossing the wire carry only the generated ids.

use parking_lot::RwLock;
use std::collections::HashMap;

use glint_core::{ActionFn, Entry, MappedEntry, QueryFn, RegistryError};

/// Generate a fresh callback id.
///
/// A v4 uuid gives a 122-bit random space, so collisions over a process
/// lifetime are negligible and ids do not correlate across sessions.
fn generate_callback_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Registry mapping generated ids to registered callbacks.
///
/// Callback lifetime is scoped to the current session: the protocol engine
/// calls [`CallbackRegistry::clear`] before every top-level query, so only
/// callbacks reachable from the most recent response tree stay resolvable.
pub struct CallbackRegistry {
    /// Registered actions by id.
    actions: RwLock<HashMap<String, ActionFn>>,

    /// Registered query callbacks by id.
    queries: RwLock<HashMap<String, QueryFn>>,
}

impl CallbackRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            actions: RwLock::new(HashMap::new()),
            queries: RwLock::new(HashMap::new()),
        }
    }

    /// Register the callbacks of a batch of entries and produce their wire
    /// form, preserving order.
    ///
    /// Each present callback gets a fresh id; an entry without callbacks
    /// maps to a `MappedEntry` with both id fields absent.
    pub fn register(&self, entries: Vec<Entry>) -> Vec<MappedEntry> {
        let mut actions = self.actions.write();
        let mut queries = self.queries.write();

        entries
            .into_iter()
            .map(|entry| {
                let Entry {
                    name,
                    hint,
                    icon,
                    is_hovered,
                    priority,
                    important,
                    action,
                    on_query,
                } = entry;

                let action_id = action.map(|f| {
                    let id = generate_callback_id();
                    actions.insert(id.clone(), f);
                    id
                });

                let on_query_id = on_query.map(|f| {
                    let id = generate_callback_id();
                    queries.insert(id.clone(), f);
                    id
                });

                MappedEntry {
                    name,
                    hint,
                    icon,
                    is_hovered,
                    priority,
                    important,
                    action_id,
                    on_query_id,
                }
            })
            .collect()
    }

    /// Look up an action by id.
    pub fn action(&self, id: &str) -> Result<ActionFn, RegistryError> {
        self.actions
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::ActionNotFound(id.to_string()))
    }

    /// Look up a query callback by id.
    pub fn query_fn(&self, id: &str) -> Result<QueryFn, RegistryError> {
        self.queries
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::QueryNotFound(id.to_string()))
    }

    /// Drop every registered callback.
    pub fn clear(&self) {
        let mut actions = self.actions.write();
        let mut queries = self.queries.write();
        tracing::debug!(
            "Clearing callback registry ({} actions, {} queries)",
            actions.len(),
            queries.len()
        );
        actions.clear();
        queries.clear();
    }

    /// Number of registered actions.
    pub fn action_count(&self) -> usize {
        self.actions.read().len()
    }

    /// Number of registered query callbacks.
    pub fn query_count(&self) -> usize {
        self.queries.read().len()
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::HandlerOutcome;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_register_maps_ids_exactly() {
        let registry = CallbackRegistry::new();

        let entries = vec![
            Entry::new("with-action").with_action(|| async { HandlerOutcome::Complete(true) }),
            Entry::new("with-query").with_on_query(|_q| async { HandlerOutcome::Entries(vec![]) }),
            Entry::new("plain"),
        ];

        let mapped = registry.register(entries);
        assert_eq!(mapped.len(), 3);

        // actionId present iff the entry had an action, onQueryId iff on_query.
        assert!(mapped[0].action_id.is_some());
        assert!(mapped[0].on_query_id.is_none());
        assert!(mapped[1].action_id.is_none());
        assert!(mapped[1].on_query_id.is_some());
        assert!(mapped[2].action_id.is_none());
        assert!(mapped[2].on_query_id.is_none());

        assert_eq!(registry.action_count(), 1);
        assert_eq!(registry.query_count(), 1);
    }

    #[test]
    fn test_register_preserves_order() {
        let registry = CallbackRegistry::new();
        let names = ["c", "a", "b"];

        let mapped = registry.register(names.into_iter().map(Entry::new).collect());
        let mapped_names: Vec<&str> = mapped.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(mapped_names, names);
    }

    #[tokio::test]
    async fn test_registered_action_round_trip() {
        let registry = CallbackRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counted = calls.clone();
        let entries = vec![Entry::new("app").with_action(move || {
            let counted = counted.clone();
            async move {
                counted.fetch_add(1, Ordering::SeqCst);
                HandlerOutcome::Complete(true)
            }
        })];

        let mapped = registry.register(entries);
        let id = mapped[0].action_id.as_deref().unwrap();

        let action = registry.action(id).unwrap();
        action().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_lookup_unknown_id_fails() {
        let registry = CallbackRegistry::new();
        assert!(matches!(
            registry.action("ghost"),
            Err(RegistryError::ActionNotFound(_))
        ));
        assert!(matches!(
            registry.query_fn("ghost"),
            Err(RegistryError::QueryNotFound(_))
        ));
    }

    #[test]
    fn test_clear_drops_callbacks() {
        let registry = CallbackRegistry::new();
        let mapped = registry.register(vec![
            Entry::new("a").with_action(|| async { HandlerOutcome::Complete(true) })
        ]);
        let id = mapped[0].action_id.clone().unwrap();

        registry.clear();
        assert_eq!(registry.action_count(), 0);
        assert!(registry.action(&id).is_err());
    }

    #[test]
    fn test_ids_are_unique() {
        let registry = CallbackRegistry::new();
        let entries: Vec<Entry> = (0..100)
            .map(|i| {
                Entry::new(format!("app-{i}"))
                    .with_action(|| async { HandlerOutcome::Complete(true) })
            })
            .collect();

        let mapped = registry.register(entries);
        let mut ids: Vec<String> = mapped
            .into_iter()
            .filter_map(|m| m.action_id)
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 100);
    }
}

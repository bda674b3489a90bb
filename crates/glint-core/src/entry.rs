//! Entry and callback types for catalog results.

use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// Result of running an [`ActionFn`] or [`QueryFn`].
///
/// Handlers either finish the flow with a success flag, or hand the host a
/// follow-up list to display.
#[derive(Clone)]
pub enum HandlerOutcome {
    /// Terminal: the host closes the flow; `true` means success.
    Complete(bool),

    /// Non-terminal: a follow-up list, displayed in order.
    Entries(Vec<Entry>),
}

impl std::fmt::Debug for HandlerOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Complete(done) => f.debug_tuple("Complete").field(done).finish(),
            Self::Entries(entries) => f
                .debug_struct("Entries")
                .field("count", &entries.len())
                .finish(),
        }
    }
}

/// A zero-argument callback invoked when an entry is selected.
pub type ActionFn = Arc<dyn Fn() -> BoxFuture<'static, HandlerOutcome> + Send + Sync>;

/// A callback invoked with the current query string for nested search.
pub type QueryFn = Arc<dyn Fn(String) -> BoxFuture<'static, HandlerOutcome> + Send + Sync>;

/// An entry is the atomic unit of data a plugin serves to the host.
///
/// Everything users search, select, and act upon is an entry. Entries are
/// produced fresh for every query response and never persisted; the
/// callbacks ride along behind `Arc` so filtered copies stay cheap.
#[derive(Clone)]
pub struct Entry {
    /// Primary display text.
    pub name: String,

    /// Secondary display text.
    pub hint: Option<String>,

    /// Resolved icon asset path, if any.
    pub icon: Option<String>,

    /// Whether the host should pre-hover this entry.
    pub is_hovered: Option<bool>,

    /// Display priority, higher sorts first.
    pub priority: Option<i64>,

    /// Marks the entry as important to the host.
    pub important: Option<bool>,

    /// Invoked when the entry is selected.
    pub action: Option<ActionFn>,

    /// Invoked with the query string for nested/refining search.
    pub on_query: Option<QueryFn>,
}

impl Entry {
    /// Create a new entry with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hint: None,
            icon: None,
            is_hovered: None,
            priority: None,
            important: None,
            action: None,
            on_query: None,
        }
    }

    /// Set the secondary display text.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Set the icon asset path.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Set the display priority.
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Attach the selection callback.
    pub fn with_action<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerOutcome> + Send + 'static,
    {
        self.action = Some(Arc::new(move || Box::pin(f())));
        self
    }

    /// Attach the nested-query callback.
    pub fn with_on_query<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerOutcome> + Send + 'static,
    {
        self.on_query = Some(Arc::new(move |query| Box::pin(f(query))));
        self
    }
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("name", &self.name)
            .field("hint", &self.hint)
            .field("icon", &self.icon)
            .field("priority", &self.priority)
            .field("has_action", &self.action.is_some())
            .field("has_on_query", &self.on_query.is_some())
            .finish()
    }
}

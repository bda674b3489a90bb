//! Protocol Engine
//!
//! Owns the persistent websocket connection to the launcher host and the
//! message dispatch loop.
//!
//! ## Message Flow
//!
//! ```text
//! host request (JSON text frame)
//!        │
//!        ▼
//! ┌────────────────┐    onQuery      ┌──────────────────┐
//! │ decode + route │ ───────────────▶│ clear registry,  │
//! │ (per-message   │                 │ plugin.on_query  │
//! │  spawned task) │    execAction / └──────────────────┘
//! └────────────────┘    onOptionQuery
//!        │                    │
//!        │                    ▼
//!        │          registry lookup → invoke callback
//!        ▼
//! register new callbacks, reply {id, options, complete}
//! ```
//!
//! Handlers run concurrently; responses may interleave in completion order.
//! The echoed request id is the only correlation the host gets.

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use glint_core::{HandlerOutcome, HostRequest, PluginResponse, RequestKind};

use crate::plugin::Plugin;
use crate::registry::CallbackRegistry;

/// Connection state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Attempting to reach the host.
    Connecting,

    /// Serving requests over a live connection.
    Connected,

    /// No connection; either between retries or after giving up.
    Disconnected,
}

/// Errors that end the engine's run loop.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Retry budget spent without holding a connection.
    #[error("gave up connecting to {url} after {attempts} attempts")]
    RetriesExhausted { url: String, attempts: u32 },
}

/// The engine owning the host connection and dispatch loop.
///
/// ## Reactive State
///
/// The session state is observable - subscribe via `state()`. Every
/// transition (Connecting/Connected/Disconnected) broadcasts to subscribers.
pub struct ProtocolEngine {
    /// The plugin answering top-level queries.
    plugin: Arc<dyn Plugin>,

    /// Callback registry for the current response tree.
    registry: Arc<CallbackRegistry>,

    /// Host connection settings.
    config: glint_core::HostConfig,

    /// Observable session state.
    state_tx: watch::Sender<SessionState>,
}

impl ProtocolEngine {
    /// Create an engine for the given plugin and host settings.
    pub fn new(plugin: Arc<dyn Plugin>, config: glint_core::HostConfig) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Disconnected);
        Self {
            plugin,
            registry: Arc::new(CallbackRegistry::new()),
            config,
            state_tx,
        }
    }

    /// Subscribe to session state changes.
    pub fn state(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// The engine's callback registry (shared Arc).
    pub fn registry(&self) -> Arc<CallbackRegistry> {
        self.registry.clone()
    }

    /// Connect and serve until the retry budget is exhausted.
    ///
    /// Reconnects with exponential backoff after a dropped connection or a
    /// failed connect; the attempt counter resets once a connection is
    /// established.
    pub async fn run(&self) -> Result<(), SessionError> {
        let mut attempt: u32 = 0;

        loop {
            if attempt >= self.config.max_reconnect_attempts {
                self.state_tx.send_replace(SessionState::Disconnected);
                return Err(SessionError::RetriesExhausted {
                    url: self.config.url.clone(),
                    attempts: attempt,
                });
            }

            if attempt > 0 {
                let delay = backoff_delay(self.config.reconnect_base_delay_ms, attempt);
                tracing::info!(
                    "Reconnecting to {} in {:?} (attempt {})",
                    self.config.url,
                    delay,
                    attempt + 1
                );
                tokio::time::sleep(delay).await;
            }

            self.state_tx.send_replace(SessionState::Connecting);

            match connect_async(&self.config.url).await {
                Ok((socket, _)) => {
                    tracing::info!(
                        "Plugin '{}' connected to host at {}",
                        self.plugin.name(),
                        self.config.url
                    );
                    self.state_tx.send_replace(SessionState::Connected);
                    attempt = 0;

                    self.serve_connection(socket).await;

                    self.state_tx.send_replace(SessionState::Disconnected);
                    tracing::warn!("Host connection closed");
                    attempt += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to connect to {}: {}", self.config.url, e);
                    attempt += 1;
                }
            }
        }
    }

    /// Serve one live connection until the socket closes.
    ///
    /// The socket is split: a writer task drains a response channel so
    /// concurrently running handlers never contend on the sink.
    async fn serve_connection(&self, socket: WebSocketStream<MaybeTlsStream<TcpStream>>) {
        let (mut sink, mut stream) = socket.split();
        let (response_tx, mut response_rx) = mpsc::unbounded_channel::<PluginResponse>();

        let writer = tokio::spawn(async move {
            while let Some(response) = response_rx.recv().await {
                match serde_json::to_string(&response) {
                    Ok(json) => {
                        if let Err(e) = sink.send(Message::Text(json)).await {
                            tracing::warn!("Failed to send response: {}", e);
                            break;
                        }
                    }
                    Err(e) => tracing::error!("Failed to encode response: {}", e),
                }
            }
        });

        while let Some(frame) = stream.next().await {
            let message = match frame {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!("Socket read error: {}", e);
                    break;
                }
            };

            let text = match message {
                Message::Text(t) => t,
                Message::Close(_) => {
                    tracing::info!("Host closed the connection");
                    break;
                }
                _ => continue,
            };

            // A malformed frame is fatal to that one request only.
            let request: HostRequest = match serde_json::from_str(&text) {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!("Dropping malformed host message: {}", e);
                    continue;
                }
            };

            tracing::debug!("Dispatching {:?} request {}", request.kind, request.id);

            let plugin = self.plugin.clone();
            let registry = self.registry.clone();
            let response_tx = response_tx.clone();
            tokio::spawn(async move {
                let response = handle_request(plugin.as_ref(), &registry, request).await;
                let _ = response_tx.send(response);
            });
        }

        // Writer drains in-flight responses, then exits with the channel.
        drop(response_tx);
        let _ = writer.await;
    }
}

/// Compute the backoff delay for the given attempt, capped at 64x base.
fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    let exponent = (attempt - 1).min(6);
    Duration::from_millis(base_ms.saturating_mul(1 << exponent))
}

/// Route one host request to the plugin or the callback registry and build
/// the response.
///
/// Lookup faults never propagate: a stale or forged id gets an explicit
/// empty response so the host's flow keeps moving.
pub async fn handle_request(
    plugin: &dyn Plugin,
    registry: &CallbackRegistry,
    request: HostRequest,
) -> PluginResponse {
    match request.kind {
        RequestKind::OnQuery => {
            // A new top-level query supersedes every previously issued
            // follow-up callback.
            registry.clear();
            let entries = plugin.on_query(&request.query).await;
            PluginResponse {
                id: request.id,
                options: registry.register(entries),
                complete: false,
            }
        }
        RequestKind::ExecAction => match registry.action(&request.action_id) {
            Ok(action) => outcome_response(request.id, action().await, registry),
            Err(e) => {
                tracing::warn!("execAction {}: {}", request.id, e);
                empty_response(request.id)
            }
        },
        RequestKind::OnOptionQuery => match registry.query_fn(&request.on_query_id) {
            Ok(query_fn) => outcome_response(request.id, query_fn(request.query).await, registry),
            Err(e) => {
                tracing::warn!("onOptionQuery {}: {}", request.id, e);
                empty_response(request.id)
            }
        },
    }
}

/// Map a handler outcome to the wire response, registering any follow-up
/// callbacks it introduced.
fn outcome_response(
    id: String,
    outcome: HandlerOutcome,
    registry: &CallbackRegistry,
) -> PluginResponse {
    match outcome {
        HandlerOutcome::Complete(done) => PluginResponse {
            id,
            options: Vec::new(),
            complete: done,
        },
        HandlerOutcome::Entries(entries) => PluginResponse {
            id,
            options: registry.register(entries),
            complete: false,
        },
    }
}

fn empty_response(id: String) -> PluginResponse {
    PluginResponse {
        id,
        options: Vec::new(),
        complete: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use glint_core::Entry;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CatalogPlugin {
        names: Vec<&'static str>,
    }

    #[async_trait]
    impl Plugin for CatalogPlugin {
        fn name(&self) -> &str {
            "test-catalog"
        }

        async fn on_query(&self, query: &str) -> Vec<Entry> {
            let needle = query.to_lowercase();
            self.names
                .iter()
                .filter(|n| n.to_lowercase().contains(&needle))
                .map(|n| Entry::new(*n).with_action(|| async { HandlerOutcome::Complete(true) }))
                .collect()
        }
    }

    fn catalog() -> CatalogPlugin {
        CatalogPlugin {
            names: vec!["Finder", "Firefox", "Safari"],
        }
    }

    fn query_request(id: &str, query: &str) -> HostRequest {
        HostRequest {
            id: id.to_string(),
            kind: RequestKind::OnQuery,
            query: query.to_string(),
            action_id: String::new(),
            on_query_id: String::new(),
        }
    }

    fn exec_request(id: &str, action_id: &str) -> HostRequest {
        HostRequest {
            id: id.to_string(),
            kind: RequestKind::ExecAction,
            query: String::new(),
            action_id: action_id.to_string(),
            on_query_id: String::new(),
        }
    }

    #[tokio::test]
    async fn test_on_query_filters_and_maps() {
        let plugin = catalog();
        let registry = CallbackRegistry::new();

        let response = handle_request(&plugin, &registry, query_request("1", "fin")).await;

        assert_eq!(response.id, "1");
        assert!(!response.complete);
        let names: Vec<&str> = response.options.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["Finder", "Firefox"]);
        assert!(response.options.iter().all(|o| o.action_id.is_some()));
    }

    #[tokio::test]
    async fn test_ghost_action_id_yields_empty_response() {
        let plugin = catalog();
        let registry = CallbackRegistry::new();

        let response = handle_request(&plugin, &registry, exec_request("1", "ghost")).await;

        assert_eq!(response.id, "1");
        assert!(response.options.is_empty());
        assert!(!response.complete);
    }

    #[tokio::test]
    async fn test_exec_action_round_trip() {
        let plugin = catalog();
        let registry = CallbackRegistry::new();

        let listed = handle_request(&plugin, &registry, query_request("1", "finder")).await;
        let action_id = listed.options[0].action_id.as_deref().unwrap();

        let response = handle_request(&plugin, &registry, exec_request("2", action_id)).await;
        assert_eq!(response.id, "2");
        assert!(response.options.is_empty());
        assert!(response.complete);
    }

    #[tokio::test]
    async fn test_new_top_level_query_supersedes_callbacks() {
        let plugin = catalog();
        let registry = CallbackRegistry::new();

        let first = handle_request(&plugin, &registry, query_request("1", "finder")).await;
        let stale_id = first.options[0].action_id.clone().unwrap();

        handle_request(&plugin, &registry, query_request("2", "safari")).await;

        let response = handle_request(&plugin, &registry, exec_request("3", &stale_id)).await;
        assert!(response.options.is_empty());
        assert!(!response.complete);
    }

    #[tokio::test]
    async fn test_action_returning_entries_registers_follow_ups() {
        struct NestingPlugin;

        #[async_trait]
        impl Plugin for NestingPlugin {
            fn name(&self) -> &str {
                "nesting"
            }

            async fn on_query(&self, _query: &str) -> Vec<Entry> {
                vec![Entry::new("parent").with_action(|| async {
                    HandlerOutcome::Entries(vec![
                        Entry::new("child").with_action(|| async { HandlerOutcome::Complete(false) })
                    ])
                })]
            }
        }

        let plugin = NestingPlugin;
        let registry = CallbackRegistry::new();

        let listed = handle_request(&plugin, &registry, query_request("1", "")).await;
        let action_id = listed.options[0].action_id.as_deref().unwrap();

        let response = handle_request(&plugin, &registry, exec_request("2", action_id)).await;
        assert!(!response.complete);
        assert_eq!(response.options.len(), 1);
        assert_eq!(response.options[0].name, "child");

        // The follow-up action is itself invokable.
        let child_id = response.options[0].action_id.as_deref().unwrap();
        let terminal = handle_request(&plugin, &registry, exec_request("3", child_id)).await;
        assert!(terminal.options.is_empty());
        assert!(!terminal.complete);
    }

    #[tokio::test]
    async fn test_on_option_query_receives_query_string() {
        let seen = Arc::new(AtomicUsize::new(0));

        struct RefiningPlugin {
            seen: Arc<AtomicUsize>,
        }

        #[async_trait]
        impl Plugin for RefiningPlugin {
            fn name(&self) -> &str {
                "refining"
            }

            async fn on_query(&self, _query: &str) -> Vec<Entry> {
                let seen = self.seen.clone();
                vec![Entry::new("refine").with_on_query(move |query| {
                    let seen = seen.clone();
                    async move {
                        if query == "nested" {
                            seen.fetch_add(1, Ordering::SeqCst);
                        }
                        HandlerOutcome::Entries(vec![Entry::new(query)])
                    }
                })]
            }
        }

        let plugin = RefiningPlugin { seen: seen.clone() };
        let registry = CallbackRegistry::new();

        let listed = handle_request(&plugin, &registry, query_request("1", "")).await;
        let on_query_id = listed.options[0].on_query_id.clone().unwrap();

        let request = HostRequest {
            id: "2".to_string(),
            kind: RequestKind::OnOptionQuery,
            query: "nested".to_string(),
            action_id: String::new(),
            on_query_id,
        };
        let response = handle_request(&plugin, &registry, request).await;

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(response.options.len(), 1);
        assert_eq!(response.options[0].name, "nested");
        assert!(!response.complete);
    }

    #[tokio::test]
    async fn test_run_gives_up_after_retry_budget() {
        let config = glint_core::HostConfig {
            // Discard port; nothing listens there.
            url: "ws://127.0.0.1:9".to_string(),
            max_reconnect_attempts: 2,
            reconnect_base_delay_ms: 1,
        };
        let engine = ProtocolEngine::new(Arc::new(catalog()), config);
        let mut state = engine.state();

        match engine.run().await {
            Err(SessionError::RetriesExhausted { attempts, .. }) => assert_eq!(attempts, 2),
            Ok(()) => panic!("expected retries to be exhausted"),
        }
        assert_eq!(*state.borrow_and_update(), SessionState::Disconnected);
    }

    #[test]
    fn test_backoff_delay_growth() {
        assert_eq!(backoff_delay(500, 1), Duration::from_millis(500));
        assert_eq!(backoff_delay(500, 2), Duration::from_millis(1000));
        assert_eq!(backoff_delay(500, 4), Duration::from_millis(4000));
        // Capped at 64x base.
        assert_eq!(backoff_delay(500, 30), Duration::from_millis(32000));
    }
}

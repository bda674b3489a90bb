//! Plugin SDK for the Glint launcher.
//!
//! A plugin is a separate process that connects to the launcher host over a
//! persistent websocket and answers three kinds of requests: top-level
//! queries, nested queries against registered callbacks, and action
//! invocations. This crate provides:
//! - `Plugin` - the trait a concrete plugin implements
//! - `CallbackRegistry` - id-to-callback mapping for wire responses
//! - `ProtocolEngine` - the connection and dispatch loop

mod plugin;
mod registry;
mod session;

pub use plugin::Plugin;
pub use registry::CallbackRegistry;
pub use session::{handle_request, ProtocolEngine, SessionError, SessionState};

//! Wire protocol records exchanged with the launcher host.
//!
//! Messages are JSON text frames over the persistent host socket. Field
//! names are part of the host contract and must stay camelCase.

use serde::{Deserialize, Serialize};

/// Kind of inbound request from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestKind {
    /// Top-level query against the plugin's root handler.
    OnQuery,

    /// Nested query against a previously registered query callback.
    OnOptionQuery,

    /// Invocation of a previously registered action.
    ExecAction,
}

/// An inbound request from the host.
///
/// The host only populates the fields relevant to the request kind; the
/// rest arrive absent and default to empty strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostRequest {
    /// Correlation id, echoed back in the response.
    pub id: String,

    /// Request kind.
    #[serde(rename = "type")]
    pub kind: RequestKind,

    /// Current query string (onQuery / onOptionQuery).
    #[serde(default)]
    pub query: String,

    /// Target action id (execAction).
    #[serde(default)]
    pub action_id: String,

    /// Target query callback id (onOptionQuery).
    #[serde(default)]
    pub on_query_id: String,
}

/// Wire form of an [`crate::Entry`]: callbacks replaced by registered ids.
///
/// At most one of `action_id` / `on_query_id` is set, matching which
/// callback the source entry carried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedEntry {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_hovered: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub important: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_query_id: Option<String>,
}

/// An outbound response to the host.
///
/// `complete` is only meaningful when the handler returned a boolean;
/// otherwise it is `false` and `options` carries the next list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginResponse {
    /// Echo of the originating request id.
    pub id: String,

    /// Next list to display, in order. Empty iff the handler was terminal.
    pub options: Vec<MappedEntry>,

    /// Terminal completion flag.
    pub complete: bool,
}

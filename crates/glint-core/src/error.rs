//! Error types shared across the plugin crates.

use thiserror::Error;

/// Callback registry lookup faults.
///
/// A stale or forged id must never crash the process; the protocol engine
/// turns these into an explicit empty response.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No action registered under the given id.
    #[error("no action registered for id '{0}'")]
    ActionNotFound(String),

    /// No query callback registered under the given id.
    #[error("no query callback registered for id '{0}'")]
    QueryNotFound(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the config file.
    #[error("IO error: {0}")]
    Io(String),

    /// TOML parse error.
    #[error("Parse error: {0}")]
    Parse(String),
}

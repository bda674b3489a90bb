//! Core types for Glint launcher plugins.
//!
//! This crate contains shared data structures used across all plugin crates:
//! - Entry and its Action/QueryFn callback types
//! - Wire protocol records exchanged with the launcher host
//! - Configuration types
//! - Error types

mod config;
mod entry;
mod error;
mod wire;

pub use config::{config_path, icon_cache_dir, HostConfig, IconConfig, PluginConfig};
pub use entry::{ActionFn, Entry, HandlerOutcome, QueryFn};
pub use error::{ConfigError, RegistryError};
pub use wire::{HostRequest, MappedEntry, PluginResponse, RequestKind};

//! Linux catalog builder: desktop-entry enumeration and parsing.

use std::path::PathBuf;
use std::sync::Arc;

use futures::StreamExt;

use glint_core::{Entry, HandlerOutcome};

use crate::icons::IconResolver;
use crate::launch::AppLauncher;

/// Builds the application list from the desktop-entry registry.
pub struct LinuxCatalogBuilder {
    /// Directory holding `.desktop` files.
    applications_dir: PathBuf,

    /// Icon lookup.
    resolver: IconResolver,

    /// Launch collaborator captured by entry actions.
    launcher: Arc<dyn AppLauncher>,
}

impl LinuxCatalogBuilder {
    /// Create a builder over the standard registry directory.
    pub fn new(launcher: Arc<dyn AppLauncher>) -> Self {
        Self {
            applications_dir: PathBuf::from("/usr/share/applications"),
            resolver: IconResolver::default(),
            launcher,
        }
    }

    /// Override the desktop-entry directory.
    pub fn with_applications_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.applications_dir = dir.into();
        self
    }

    /// Override the icon resolver.
    pub fn with_resolver(mut self, resolver: IconResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Build the entry list.
    ///
    /// Entries are built concurrently with a fan-out bounded by available
    /// parallelism; `buffered` keeps the sorted listing order so repeated
    /// builds over an unchanged tree are identical.
    pub async fn build(&self) -> Vec<Entry> {
        let mut paths = Vec::new();

        let mut reader = match tokio::fs::read_dir(&self.applications_dir).await {
            Ok(reader) => reader,
            Err(e) => {
                tracing::warn!(
                    "Failed to list {}: {}",
                    self.applications_dir.display(),
                    e
                );
                return Vec::new();
            }
        };

        while let Ok(Some(item)) = reader.next_entry().await {
            let path = item.path();
            if path.extension().is_some_and(|ext| ext == "desktop") {
                paths.push(path);
            }
        }
        paths.sort();

        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);

        futures::stream::iter(paths)
            .map(|path| self.build_entry(path))
            .buffered(workers)
            .filter_map(|entry| async move { entry })
            .collect()
            .await
    }

    /// Build one entry from a desktop file.
    ///
    /// A malformed file yields empty fields rather than failing the build;
    /// only an unreadable file is skipped.
    async fn build_entry(&self, path: PathBuf) -> Option<Entry> {
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                return None;
            }
        };

        let name = field_value(&content, "Name=");
        let command = sanitize_exec(field_value(&content, "Exec="));

        let icon_name = field_value(&content, "Icon=");
        let icon = if icon_name.is_empty() {
            None
        } else {
            self.resolver.resolve(icon_name).await
        };

        let mut entry = Entry::new(name);
        if let Some(icon) = icon {
            entry = entry.with_icon(icon.to_string_lossy());
        }

        let launcher = self.launcher.clone();
        Some(entry.with_action(move || {
            let launcher = launcher.clone();
            let command = command.clone();
            async move {
                // Launch failures are logged, not surfaced: the host flow
                // always sees success.
                if let Err(e) = launcher.launch_detached(&command).await {
                    tracing::warn!("Failed to launch '{}': {}", command, e);
                }
                HandlerOutcome::Complete(true)
            }
        }))
    }
}

/// First matching `Key=` line of a desktop file, or `""` when absent.
fn field_value<'a>(content: &'a str, key: &str) -> &'a str {
    content
        .lines()
        .find_map(|line| line.strip_prefix(key))
        .unwrap_or("")
}

/// Sanitize an `Exec=` command line.
///
/// Heuristic, not a shell parser: drops `%`-placeholder tokens, cuts the
/// tail at the first flag-looking token, strips quotes, trims whitespace.
fn sanitize_exec(exec: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for token in exec.split_whitespace() {
        if token.starts_with('%') {
            continue;
        }
        if token.starts_with('-') {
            break;
        }
        kept.push(token);
    }
    kept.join(" ").replace('"', "").trim().to_string()
}

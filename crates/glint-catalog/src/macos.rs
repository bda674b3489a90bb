//! macOS catalog builder: application bundle walk and icon cache.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glint_core::{Entry, HandlerOutcome};

use crate::launch::AppLauncher;
use crate::render::IconRenderer;

/// Directory suffix marking an application bundle.
const APP_BUNDLE_SUFFIX: &str = ".app";

/// Finder has no bundle under the scanned roots; appended explicitly.
const FINDER_PATH: &str = "/System/Library/CoreServices/Finder.app";

/// One discovered application bundle.
#[derive(Debug, Clone)]
struct AppBundle {
    name: String,
    path: PathBuf,
}

/// Builds the application list by walking the bundle directories.
pub struct MacCatalogBuilder {
    /// Scan roots.
    roots: Vec<PathBuf>,

    /// Where rendered icons are written.
    cache_dir: PathBuf,

    /// Pixel size for rendered icons.
    icon_size: u32,

    /// Icon rendering collaborator.
    renderer: Arc<dyn IconRenderer>,

    /// Launch collaborator captured by entry actions.
    launcher: Arc<dyn AppLauncher>,
}

/// Standard scan roots, `~` expanded to the invoking user's home.
pub fn default_roots() -> Vec<PathBuf> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"));
    vec![
        PathBuf::from("/System/Applications"),
        PathBuf::from("/System/Applications/Utilities"),
        PathBuf::from("/Applications"),
        home.join("Applications"),
        home.join("Applications/Chrome Apps.localized"),
    ]
}

impl MacCatalogBuilder {
    /// Create a builder over the standard roots.
    pub fn new(
        launcher: Arc<dyn AppLauncher>,
        renderer: Arc<dyn IconRenderer>,
        cache_dir: PathBuf,
        icon_size: u32,
    ) -> Self {
        Self {
            roots: default_roots(),
            cache_dir,
            icon_size,
            renderer,
            launcher,
        }
    }

    /// Override the scan roots.
    pub fn with_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.roots = roots;
        self
    }

    /// Build the entry list.
    pub async fn build(&self) -> Vec<Entry> {
        let mut bundles = self.collect_bundles().await;

        // Legacy alias that collides with the Settings pseudo-entry.
        bundles.retain(|b| b.name != "System Preferences");
        bundles.push(AppBundle {
            name: "Finder".to_string(),
            path: PathBuf::from(FINDER_PATH),
        });

        let icons = self.render_icon_cache(&bundles).await;

        bundles
            .into_iter()
            .zip(icons)
            .map(|(bundle, icon)| {
                let mut entry = Entry::new(bundle.name);
                if let Some(icon) = icon {
                    entry = entry.with_icon(icon.to_string_lossy());
                }

                let launcher = self.launcher.clone();
                let path = bundle.path;
                entry.with_action(move || {
                    let launcher = launcher.clone();
                    let path = path.clone();
                    async move {
                        if let Err(e) = launcher.open_path(&path).await {
                            tracing::warn!("Failed to open {}: {}", path.display(), e);
                        }
                        HandlerOutcome::Complete(true)
                    }
                })
            })
            .collect()
    }

    /// Walk the roots and collect bundles.
    ///
    /// A directory ending in the bundle suffix is a leaf result; other
    /// directories are descended only while still within a root or its
    /// immediate children. Listing failures skip that directory.
    async fn collect_bundles(&self) -> Vec<AppBundle> {
        let mut bundles = Vec::new();
        let mut pending: VecDeque<(PathBuf, usize)> =
            self.roots.iter().map(|r| (r.clone(), 0)).collect();

        while let Some((dir, depth)) = pending.pop_front() {
            let mut reader = match tokio::fs::read_dir(&dir).await {
                Ok(reader) => reader,
                Err(e) => {
                    tracing::debug!("Skipping {}: {}", dir.display(), e);
                    continue;
                }
            };

            let mut children = Vec::new();
            while let Ok(Some(item)) = reader.next_entry().await {
                if let Some(name) = item.file_name().to_str() {
                    let is_dir = item
                        .file_type()
                        .await
                        .map(|t| t.is_dir())
                        .unwrap_or(false);
                    children.push((name.to_string(), is_dir));
                }
            }
            children.sort();

            for (name, is_dir) in children {
                if name.is_empty() || !is_dir {
                    continue;
                }
                if let Some(stem) = name.strip_suffix(APP_BUNDLE_SUFFIX) {
                    bundles.push(AppBundle {
                        name: stem.to_string(),
                        path: dir.join(&name),
                    });
                } else if depth <= 1 {
                    pending.push_back((dir.join(&name), depth + 1));
                }
            }
        }

        bundles
    }

    /// Batch-render icons into the cache directory.
    ///
    /// Returns one cache path per bundle, `None` where rendering or
    /// writing failed; entries without icons are still served.
    async fn render_icon_cache(&self, bundles: &[AppBundle]) -> Vec<Option<PathBuf>> {
        if let Err(e) = tokio::fs::create_dir_all(&self.cache_dir).await {
            tracing::warn!(
                "Failed to create icon cache {}: {}",
                self.cache_dir.display(),
                e
            );
            return vec![None; bundles.len()];
        }

        let paths: Vec<PathBuf> = bundles.iter().map(|b| b.path.clone()).collect();
        let rendered = self.renderer.render_icons(&paths, self.icon_size).await;

        let mut icons = Vec::with_capacity(bundles.len());
        for (bundle, bytes) in bundles.iter().zip(rendered) {
            let icon = match bytes {
                Some(bytes) => {
                    let file = self
                        .cache_dir
                        .join(format!("{}.png", cache_file_stem(&bundle.name)));
                    match tokio::fs::write(&file, bytes).await {
                        Ok(()) => Some(file),
                        Err(e) => {
                            tracing::warn!("Failed to cache icon for {}: {}", bundle.name, e);
                            None
                        }
                    }
                }
                None => None,
            };
            icons.push(icon);
        }
        icons
    }
}

/// Filesystem-safe cache file stem: whitespace runs become single dashes.
fn cache_file_stem(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("-")
}

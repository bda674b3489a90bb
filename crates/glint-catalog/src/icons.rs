//! Icon lookup across an ordered set of candidate directories and formats.

use std::path::PathBuf;

/// Resolves a raw icon identifier to a concrete asset path.
///
/// The probe order is a priority order: directories outrank formats, and
/// within a directory the first format wins. Identifiers that already look
/// like paths are returned unchanged without touching the filesystem.
pub struct IconResolver {
    /// Candidate directories, highest priority first.
    directories: Vec<PathBuf>,

    /// Candidate file extensions, highest priority first.
    formats: Vec<String>,
}

impl IconResolver {
    /// Create a resolver with explicit candidates.
    pub fn new(directories: Vec<PathBuf>, formats: Vec<String>) -> Self {
        Self {
            directories,
            formats,
        }
    }

    /// Resolve an icon identifier to an asset path, or `None` when no
    /// candidate exists. Missing icons are non-fatal for callers.
    ///
    /// All existence checks run concurrently; selection still follows the
    /// declared priority order, not completion order.
    pub async fn resolve(&self, icon: &str) -> Option<PathBuf> {
        if icon.contains('/') {
            return Some(PathBuf::from(icon));
        }

        let candidates: Vec<PathBuf> = self
            .directories
            .iter()
            .flat_map(|dir| {
                self.formats
                    .iter()
                    .map(move |format| dir.join(format!("{icon}.{format}")))
            })
            .collect();

        let checks = candidates.iter().map(tokio::fs::try_exists);
        let results = futures::future::join_all(checks).await;

        candidates
            .into_iter()
            .zip(results)
            .find(|(_, exists)| matches!(exists, Ok(true)))
            .map(|(path, _)| path)
    }
}

impl Default for IconResolver {
    /// Standard Linux icon locations, in priority order.
    fn default() -> Self {
        Self::new(
            vec![
                PathBuf::from("/usr/share/icons/hicolor/64x64/apps"),
                PathBuf::from("/usr/share/icons/Papirus/64x64/apps"),
                PathBuf::from("/usr/share/icons/Adwaita/64x64/places"),
                PathBuf::from("/usr/share/icons/Adwaita/22x22/places"),
                PathBuf::from("/usr/share/pixmaps"),
            ],
            vec!["svg".to_string(), "png".to_string()],
        )
    }
}

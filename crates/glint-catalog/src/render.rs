//! Icon rendering collaborator for macOS application bundles.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Seam for extracting application icons as raw image bytes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IconRenderer: Send + Sync {
    /// Render one icon per path at the given pixel size.
    ///
    /// Best-effort: a path whose icon cannot be rendered yields `None` at
    /// its position, never an error.
    async fn render_icons(&self, paths: &[PathBuf], size: u32) -> Vec<Option<Vec<u8>>>;
}

/// Renderer shelling out to `sips` on each bundle's `.icns` resource.
pub struct SipsIconRenderer;

#[async_trait]
impl IconRenderer for SipsIconRenderer {
    async fn render_icons(&self, paths: &[PathBuf], size: u32) -> Vec<Option<Vec<u8>>> {
        let mut rendered = Vec::with_capacity(paths.len());
        for path in paths {
            rendered.push(render_bundle_icon(path, size).await);
        }
        rendered
    }
}

async fn render_bundle_icon(bundle: &Path, size: u32) -> Option<Vec<u8>> {
    let icns = find_bundle_icns(bundle).await?;
    let out = std::env::temp_dir().join(format!(
        "glint-icon-{}.png",
        uuid::Uuid::new_v4().simple()
    ));

    let status = Command::new("sips")
        .arg("-z")
        .arg(size.to_string())
        .arg(size.to_string())
        .arg("-s")
        .arg("format")
        .arg("png")
        .arg(&icns)
        .arg("--out")
        .arg(&out)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .ok()?;

    if !status.success() {
        tracing::debug!("sips failed for {}: {}", icns.display(), status);
        return None;
    }

    let bytes = tokio::fs::read(&out).await.ok();
    let _ = tokio::fs::remove_file(&out).await;
    bytes
}

/// Find the bundle's `.icns` resource, if any.
async fn find_bundle_icns(bundle: &Path) -> Option<PathBuf> {
    let resources = bundle.join("Contents/Resources");
    let mut reader = tokio::fs::read_dir(&resources).await.ok()?;

    let mut candidates = Vec::new();
    while let Ok(Some(item)) = reader.next_entry().await {
        let path = item.path();
        if path.extension().is_some_and(|ext| ext == "icns") {
            candidates.push(path);
        }
    }

    candidates.sort();
    candidates.into_iter().next()
}

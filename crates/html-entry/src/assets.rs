//! Compiled assets discovered on disk.

use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use html_entry_plugin::{AssetCollection, OutputEntry};
use walkdir::WalkDir;

/// An asset produced by the bundler, read from disk during discovery.
///
/// `size` is the on-disk byte count; non-UTF-8 content is decoded lossily.
#[derive(Debug)]
pub struct DiskAsset {
    content: String,
    size: usize,
}

impl DiskAsset {
    /// Read the asset at `path`.
    pub async fn read(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read asset {}", path.display()))?;

        Ok(Self {
            size: bytes.len(),
            content: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

impl OutputEntry for DiskAsset {
    fn source(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.content)
    }

    fn size(&self) -> usize {
        self.size
    }
}

/// Register every file under `dir` as an asset, keyed by its
/// `/`-separated path relative to `dir`.
pub async fn discover_assets(dir: &Path, assets: &AssetCollection) -> Result<usize> {
    if !dir.exists() {
        anyhow::bail!(
            "Assets directory not found: {}. Run your bundler first.",
            dir.display()
        );
    }

    let mut count = 0;
    for entry in WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let relative = path.strip_prefix(dir).unwrap_or(path);
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let asset = DiskAsset::read(path).await?;
        assets.insert(key, Arc::new(asset)).await;
        count += 1;
    }

    Ok(count)
}

//! Build output entries and the shared asset collection.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::EmitError;

/// The interface the host needs from every registered asset.
pub trait OutputEntry: Send + Sync + fmt::Debug {
    /// Full content of the asset.
    fn source(&self) -> Cow<'_, str>;

    /// Length of the content in bytes.
    fn size(&self) -> usize;
}

/// An in-memory asset holding its text verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSource {
    content: String,
}

impl RawSource {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl OutputEntry for RawSource {
    fn source(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.content)
    }

    fn size(&self) -> usize {
        self.content.len()
    }
}

/// The build's mutable asset map, keyed by output path.
///
/// Clones share the same underlying map. Writes to an existing key replace
/// the previous entry.
#[derive(Debug, Clone, Default)]
pub struct AssetCollection {
    entries: Arc<Mutex<BTreeMap<String, Arc<dyn OutputEntry>>>>,
}

impl AssetCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an entry, returning the one it replaced.
    pub async fn insert(
        &self,
        key: impl Into<String>,
        entry: Arc<dyn OutputEntry>,
    ) -> Option<Arc<dyn OutputEntry>> {
        self.entries.lock().await.insert(key.into(), entry)
    }

    pub async fn get(&self, key: &str) -> Option<Arc<dyn OutputEntry>> {
        self.entries.lock().await.get(key).cloned()
    }

    /// Asset identifiers present right now.
    pub async fn keys(&self) -> Vec<String> {
        self.entries.lock().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Copy of the current map. Entries are shared, not cloned.
    pub async fn snapshot(&self) -> BTreeMap<String, Arc<dyn OutputEntry>> {
        self.entries.lock().await.clone()
    }
}

/// Where a template's rendered output is registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputKey {
    /// Template file name, as reported in progress events
    pub file_name: String,

    /// Key in the asset collection
    pub path: String,
}

/// Compute where a template's rendered output is registered.
///
/// Depends only on the template's file name, never on the asset.
pub fn output_key(output: &Path, template: &Path) -> Result<OutputKey, EmitError> {
    let file_name = template
        .file_name()
        .ok_or_else(|| EmitError::InvalidTemplatePath {
            template: template.to_path_buf(),
        })?;

    Ok(OutputKey {
        file_name: file_name.to_string_lossy().into_owned(),
        path: output.join(file_name).to_string_lossy().into_owned(),
    })
}

/// Registers rendered HTML in the asset collection.
pub struct AssetRegistrar;

impl AssetRegistrar {
    pub async fn register(collection: &AssetCollection, output_path: String, html: String) {
        tracing::debug!("Registering {} ({} bytes)", output_path, html.len());
        collection
            .insert(output_path, Arc::new(RawSource::new(html)))
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn size_counts_utf8_bytes() {
        let entry = RawSource::new("<p>héllo</p>");

        assert_eq!(entry.source(), "<p>héllo</p>");
        assert_eq!(entry.size(), 13);
    }

    #[test]
    fn output_key_uses_template_file_name() {
        let key = output_key(Path::new("dist"), Path::new("templates/main.tmpl")).unwrap();
        assert_eq!(key.path, "dist/main.tmpl");
        assert_eq!(key.file_name, "main.tmpl");
    }

    #[test]
    fn output_key_rejects_paths_without_file_name() {
        let err = output_key(Path::new("dist"), Path::new("..")).unwrap_err();
        assert!(matches!(err, EmitError::InvalidTemplatePath { .. }));
    }

    #[tokio::test]
    async fn register_overwrites_existing_key() {
        let assets = AssetCollection::new();

        AssetRegistrar::register(&assets, "dist/index.html".into(), "first".into()).await;
        AssetRegistrar::register(&assets, "dist/index.html".into(), "second".into()).await;

        assert_eq!(assets.len().await, 1);
        let entry = assets.get("dist/index.html").await.unwrap();
        assert_eq!(entry.source(), "second");
        assert_eq!(entry.size(), 6);
    }

    #[tokio::test]
    async fn clones_share_entries() {
        let assets = AssetCollection::new();
        let other = assets.clone();

        other
            .insert("main.js", Arc::new(RawSource::new("console.log(1)")))
            .await;

        assert_eq!(assets.keys().await, vec!["main.js".to_string()]);
    }
}

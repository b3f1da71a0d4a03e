//! Template loading and placeholder substitution.

use std::io;
use std::path::Path;

use crate::error::EmitError;

/// The only placeholder recognised in templates.
pub const PLACEHOLDER: &str = "{{asset}}";

/// Template renderer.
pub struct TemplateRenderer;

impl TemplateRenderer {
    /// Read a template as UTF-8 text.
    pub async fn load(path: &Path) -> Result<String, EmitError> {
        tracing::debug!("Reading template {}", path.display());

        tokio::fs::read_to_string(path)
            .await
            .map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => EmitError::TemplateMissing {
                    path: path.to_path_buf(),
                },
                _ => EmitError::Io {
                    path: path.to_path_buf(),
                    source,
                },
            })
    }

    /// Replace the first placeholder with the asset identifier.
    ///
    /// Content without a placeholder is returned unchanged.
    pub fn substitute(raw: &str, asset: &str) -> String {
        raw.replacen(PLACEHOLDER, asset, 1)
    }

    /// Load the template at `path` and render it for `asset`.
    pub async fn render(path: &Path, asset: &str) -> Result<String, EmitError> {
        let raw = Self::load(path).await?;
        Ok(Self::substitute(&raw, asset))
    }
}

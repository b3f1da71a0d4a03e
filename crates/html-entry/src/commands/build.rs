//! One-shot build command.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use html_entry_plugin::{BuildHost, HtmlEntryPlugin, OutputEntry, PluginOptions};

use crate::assets::discover_assets;
use crate::config::{context_dir, load_config};

type Snapshot = BTreeMap<String, Arc<dyn OutputEntry>>;

/// A resolved build: config loaded, paths made absolute.
#[derive(Debug)]
pub struct Build {
    context: PathBuf,
    assets_dir: PathBuf,
    out_dir: PathBuf,
    options: PluginOptions,
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildReport {
    /// Number of compiled assets discovered
    pub assets: usize,

    /// Files written to the output directory
    pub written: Vec<PathBuf>,

    /// Template dependencies registered during emit
    pub dependencies: Vec<PathBuf>,

    /// Total build time in milliseconds
    pub duration_ms: u64,
}

impl Build {
    /// Load the config at `config_path`. Command-line directories override
    /// the config's `[build]` settings.
    pub fn prepare(
        config_path: &Path,
        assets: Option<PathBuf>,
        out: Option<PathBuf>,
    ) -> Result<Self> {
        let config = load_config(config_path)?;
        let context = context_dir(config_path)?;
        let options = config.plugin_options()?;

        Ok(Self {
            assets_dir: assets.unwrap_or_else(|| context.join(&config.build.assets_dir)),
            out_dir: out.unwrap_or_else(|| context.join(&config.build.out_dir)),
            context,
            options,
        })
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Every configured template, resolved against the context directory.
    pub fn templates(&self) -> Vec<PathBuf> {
        self.options
            .templates
            .iter()
            .map(|rule| self.context.join(rule.template()))
            .collect()
    }

    /// Run one emit cycle and write the entries it produced.
    pub async fn execute(&self) -> Result<BuildReport> {
        let start = Instant::now();

        let mut host = BuildHost::new(&self.context);
        HtmlEntryPlugin::new(self.options.clone()).apply(&mut host);

        let compilation = host.compilation();
        let assets = discover_assets(&self.assets_dir, compilation.assets()).await?;
        tracing::debug!("Discovered {} assets in {}", assets, self.assets_dir.display());

        let before = compilation.assets().snapshot().await;
        host.emit(&compilation).await?;
        let after = compilation.assets().snapshot().await;

        let written = self.write_emitted(&before, &after)?;

        Ok(BuildReport {
            assets,
            written,
            dependencies: compilation.file_dependencies().await,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Write entries that are new, or replaced, since `before`.
    fn write_emitted(&self, before: &Snapshot, after: &Snapshot) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        for (key, entry) in after {
            if before.get(key).is_some_and(|prev| Arc::ptr_eq(prev, entry)) {
                continue;
            }

            let path = self.out_dir.join(key);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(&path, entry.source().as_bytes())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::debug!("Wrote {} ({} bytes)", path.display(), entry.size());

            written.push(path);
        }

        Ok(written)
    }
}

/// Run the build command.
pub async fn run(config: &Path, assets: Option<PathBuf>, out: Option<PathBuf>) -> Result<()> {
    tracing::info!("Building HTML entry points...");

    let build = Build::prepare(config, assets, out)?;
    let report = build.execute().await?;

    tracing::info!(
        "Wrote {} entries for {} assets in {}ms",
        report.written.len(),
        report.assets,
        report.duration_ms
    );
    tracing::info!("Output: {}", build.out_dir().display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    const CONFIG: &str = r#"
output = "html"

[[templates]]
test = "^main"
template = "templates/main.html"

[[templates]]
test = "^tests"
template = "templates/tests.html"
"#;

    fn scaffold(root: &Path) -> PathBuf {
        fs::create_dir_all(root.join("templates")).unwrap();
        fs::create_dir_all(root.join("dist")).unwrap();
        fs::write(
            root.join("templates/main.html"),
            "<script src=\"{{asset}}\"></script>",
        )
        .unwrap();
        fs::write(root.join("templates/tests.html"), "<title>tests</title>").unwrap();
        fs::write(root.join("dist/main.js"), "main()").unwrap();
        fs::write(root.join("dist/tests.js"), "run()").unwrap();

        let config = root.join("html-entry.toml");
        fs::write(&config, CONFIG).unwrap();
        config
    }

    #[tokio::test]
    async fn writes_one_entry_per_asset() {
        let temp = tempdir().unwrap();
        let config = scaffold(temp.path());

        let build = Build::prepare(&config, None, None).unwrap();
        let report = build.execute().await.unwrap();

        assert_eq!(report.assets, 2);
        assert_eq!(report.written.len(), 2);
        assert_eq!(report.dependencies.len(), 2);

        let out = build.out_dir().to_path_buf();
        assert_eq!(
            fs::read_to_string(out.join("html/main.html")).unwrap(),
            "<script src=\"main.js\"></script>"
        );
        assert_eq!(
            fs::read_to_string(out.join("html/tests.html")).unwrap(),
            "<title>tests</title>"
        );
        assert!(!out.join("main.js").exists());
    }

    #[tokio::test]
    async fn unmatched_asset_fails_the_build() {
        let temp = tempdir().unwrap();
        let config = scaffold(temp.path());
        fs::write(temp.path().join("dist/vendor.js"), "").unwrap();

        let build = Build::prepare(&config, None, None).unwrap();
        let err = build.execute().await.unwrap_err();

        assert_eq!(err.to_string(), "No template options for vendor.js");
    }

    #[tokio::test]
    async fn command_line_directories_override_config() {
        let temp = tempdir().unwrap();
        let config = scaffold(temp.path());
        let out = temp.path().join("site");

        let build = Build::prepare(&config, None, Some(out.clone())).unwrap();
        build.execute().await.unwrap();

        assert!(out.join("html/main.html").exists());
    }
}

//! Configuration file structure (html-entry.toml).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use html_entry_plugin::{PluginOptions, TemplateRule};
use regex::Regex;
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "html-entry.toml";

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    /// Directory prefix for emitted entries
    pub output: PathBuf,

    /// Ordered template rules
    pub templates: Vec<RuleConfig>,

    #[serde(default)]
    pub build: BuildSettings,
}

#[derive(Debug, Deserialize)]
pub struct RuleConfig {
    /// Regex tested against each asset identifier
    pub test: String,

    /// Template path, relative to the config file
    pub template: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct BuildSettings {
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            assets_dir: default_assets_dir(),
            out_dir: default_out_dir(),
        }
    }
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("dist")
}
fn default_out_dir() -> PathBuf {
    PathBuf::from("public")
}

impl ConfigFile {
    /// Parse a config from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config")
    }

    /// Compile the template rules into plugin options.
    pub fn plugin_options(&self) -> Result<PluginOptions> {
        let templates = self
            .templates
            .iter()
            .map(|rule| -> Result<TemplateRule> {
                let pattern = Regex::new(&rule.test)
                    .with_context(|| format!("Invalid template test pattern: {}", rule.test))?;
                Ok(TemplateRule::regex(pattern, rule.template.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(PluginOptions {
            templates,
            output: self.output.clone(),
        })
    }
}

/// Load the config at `path`. Unlike missing optional settings, a missing
/// file is an error: `output` and `templates` have no defaults.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config = ConfigFile::parse(&content)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Directory that templates and build paths are resolved against.
pub fn context_dir(config_path: &Path) -> Result<PathBuf> {
    let dir = match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::canonicalize(dir).with_context(|| format!("Failed to resolve {}", dir.display()))
}

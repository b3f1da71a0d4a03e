//! Scaffold a config file and a starter template.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing html-entry...");

    if config_path.exists() && !yes {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
        return Ok(());
    }

    let root = match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    tracing::info!("Created {}", config_path.display());

    let templates_dir = root.join("templates");
    fs::create_dir_all(&templates_dir).context("Failed to create templates directory")?;

    let index_path = templates_dir.join("index.html");
    if !index_path.exists() || yes {
        fs::write(&index_path, DEFAULT_TEMPLATE).context("Failed to write index.html")?;
        tracing::info!("Created {}", index_path.display());
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'html-entry build' after your bundler has produced dist/.");

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# html-entry configuration

# Directory prefix for emitted HTML entries
output = "html"

# Rules are tried in order; the first whose test matches an asset wins.
[[templates]]
test = "\\.js$"
template = "templates/index.html"

[build]
assets_dir = "dist"
out_dir = "public"
"#;

const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
</head>
<body>
  <script src="{{asset}}"></script>
</body>
</html>
"#;

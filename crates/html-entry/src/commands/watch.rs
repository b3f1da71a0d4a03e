//! Rebuild whenever a template or compiled asset changes.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::commands::build::Build;
use crate::watcher::FileWatcher;

/// Run the watch command.
pub async fn run(config: &Path, assets: Option<PathBuf>, out: Option<PathBuf>) -> Result<()> {
    let build = Build::prepare(config, assets, out)?;

    loop {
        let mut watched = build.templates();

        match build.execute().await {
            Ok(report) => {
                tracing::info!(
                    "Wrote {} entries for {} assets in {}ms",
                    report.written.len(),
                    report.assets,
                    report.duration_ms
                );
                watched.extend(report.dependencies);
            }
            // A broken template should not end the session.
            Err(e) => tracing::error!("Build failed: {:#}", e),
        }

        watched.sort();
        watched.dedup();

        let (watcher, mut rx) = FileWatcher::new(&watched, build.assets_dir())?;
        tracing::info!(
            "Watching {} templates and {}",
            watched.len(),
            build.assets_dir().display()
        );

        tokio::select! {
            event = rx.recv() => match event {
                Some(event) => {
                    tracing::info!("Change detected: {}", event.path().display());
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopping watch");
                break;
            }
        }

        drop(watcher);
    }

    Ok(())
}

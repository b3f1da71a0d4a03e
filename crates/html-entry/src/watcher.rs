//! File watching for rebuilds.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// A change that invalidates the last build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A registered template dependency changed
    TemplateChanged(PathBuf),

    /// A compiled asset was created, modified or removed
    AssetChanged(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            WatchEvent::TemplateChanged(path) | WatchEvent::AssetChanged(path) => path,
        }
    }
}

/// Watches template dependencies and the assets directory.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Create a watcher for `dependencies` and everything under `assets_dir`.
    ///
    /// Returns the watcher and a channel to receive events. Dropping the
    /// watcher closes the channel.
    pub fn new(
        dependencies: &[PathBuf],
        assets_dir: &Path,
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        // Editors often replace files, so watch the containing directories.
        let parents: BTreeSet<&Path> = dependencies.iter().filter_map(|p| p.parent()).collect();
        for dir in parents {
            if dir.exists() {
                watcher
                    .watch(dir, RecursiveMode::NonRecursive)
                    .map_err(std::io::Error::other)?;
            }
        }
        if assets_dir.exists() {
            watcher
                .watch(assets_dir, RecursiveMode::Recursive)
                .map_err(std::io::Error::other)?;
        }

        let templates: HashSet<PathBuf> = dependencies.iter().cloned().collect();
        let assets_dir = assets_dir.to_path_buf();
        std::thread::spawn(move || {
            let mut last_event_time: Option<Instant> = None;
            let debounce_duration = Duration::from_millis(100);

            while let Ok(event) = sync_rx.recv() {
                // Debounce rapid events
                let now = Instant::now();
                if last_event_time.is_some_and(|last| now.duration_since(last) < debounce_duration)
                {
                    continue;
                }

                for path in event.paths {
                    if let Some(e) = classify_event(&path, &event.kind, &templates, &assets_dir) {
                        last_event_time = Some(now);
                        if async_tx.blocking_send(e).is_err() {
                            return;
                        }
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Classify a notify event into a WatchEvent.
fn classify_event(
    path: &Path,
    kind: &notify::EventKind,
    templates: &HashSet<PathBuf>,
    assets_dir: &Path,
) -> Option<WatchEvent> {
    use notify::EventKind;

    if !matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return None;
    }

    if templates.contains(path) {
        Some(WatchEvent::TemplateChanged(path.to_path_buf()))
    } else if path.starts_with(assets_dir) {
        Some(WatchEvent::AssetChanged(path.to_path_buf()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind};
    use notify::EventKind;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn classifies_templates_and_assets() {
        let templates: HashSet<PathBuf> = [PathBuf::from("/site/templates/main.html")].into();
        let assets = Path::new("/site/dist");
        let modify = EventKind::Modify(ModifyKind::Any);

        assert_eq!(
            classify_event(
                Path::new("/site/templates/main.html"),
                &modify,
                &templates,
                assets
            ),
            Some(WatchEvent::TemplateChanged(PathBuf::from(
                "/site/templates/main.html"
            )))
        );
        assert_eq!(
            classify_event(
                Path::new("/site/dist/main.js"),
                &EventKind::Create(CreateKind::File),
                &templates,
                assets
            ),
            Some(WatchEvent::AssetChanged(PathBuf::from("/site/dist/main.js")))
        );
        assert_eq!(
            classify_event(
                Path::new("/site/templates/other.html"),
                &modify,
                &templates,
                assets
            ),
            None
        );
        assert_eq!(
            classify_event(
                Path::new("/site/dist/main.js"),
                &EventKind::Access(AccessKind::Any),
                &templates,
                assets
            ),
            None
        );
    }

    #[tokio::test]
    async fn watches_template_changes() {
        let temp = tempdir().unwrap();
        let template = temp.path().join("index.html");
        fs::write(&template, "<p>{{asset}}</p>").unwrap();
        let template = fs::canonicalize(&template).unwrap();

        let (watcher, mut rx) =
            FileWatcher::new(&[template.clone()], &temp.path().join("dist")).unwrap();

        // Give inotify time to set up
        tokio::time::sleep(Duration::from_millis(100)).await;

        fs::write(&template, "<div>{{asset}}</div>").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(3), rx.recv()).await;

        // Keep watcher alive until we're done
        drop(watcher);

        let event = event.expect("timeout waiting for file watch event");
        assert_eq!(event, Some(WatchEvent::TemplateChanged(template)));
    }
}

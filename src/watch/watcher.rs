// src/watch/watcher.rs

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use anyhow::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::info;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive
/// for as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher observing `root` recursively.
///
/// Every notify event is relativized against `root` and its paths sent as
/// one batch over `tx`. Filtering against the configured watch patterns
/// happens downstream in the build orchestrator, which also keeps the
/// feedback loop harmless: compiled `.css` outputs trigger events, but their
/// sources are up to date by then.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    tx: mpsc::Sender<Vec<String>>,
) -> Result<WatcherHandle> {
    let root = root.into();
    let root = root.canonicalize().unwrap_or_else(|_| root.clone()); // best-effort

    let cb_root = root.clone();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let changed: Vec<String> = event
                    .paths
                    .iter()
                    .filter_map(|path| relative_str(&cb_root, path))
                    .collect();
                if !changed.is_empty() && tx.send(changed).is_err() {
                    // Receiver gone; nothing left to notify.
                    eprintln!("watchless: change channel closed");
                }
            }
            Err(err) => {
                eprintln!("watchless: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;

    info!("file watcher started on {:?}", root);

    Ok(WatcherHandle { _inner: watcher })
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Returns `None` if the path is not under `root` and cannot be relativized.
fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let s = rel.to_string_lossy().replace('\\', "/");
    Some(s)
}

//! Config-change signalling.
//!
//! The daemon restarts its listen loop (reload config, resubscribe) when the
//! configuration file changes.  The change is delivered as a
//! [`ReloadSignal`] handed to the loop and checked only between
//! reconciliation passes; a running pass always finishes.

use log::debug;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// Error from setting up the file watcher.
#[derive(Debug, thiserror::Error)]
#[error("config watch error: {0}")]
pub struct WatchError(#[from] notify::Error);

/// Fires once the configuration should be reloaded.
#[derive(Debug)]
pub struct ReloadSignal {
    rx: Option<mpsc::Receiver<()>>,
}

impl ReloadSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        Self { rx: None }
    }

    /// A signal fired by sending on the returned sender.
    pub fn channel() -> (mpsc::Sender<()>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx: Some(rx) })
    }

    /// Whether a reload was requested since the last check.  Never blocks;
    /// pending notifications are drained.
    pub fn triggered(&self) -> bool {
        let Some(rx) = &self.rx else {
            return false;
        };
        let mut fired = false;
        while rx.try_recv().is_ok() {
            fired = true;
        }
        fired
    }
}

/// Keeps the underlying watcher alive; dropping it stops watching.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    path: PathBuf,
}

impl ConfigWatcher {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Watch `path` for changes.
///
/// The parent directory is watched so that editors which replace the file
/// (write to a temp file, then rename) are still noticed.
pub fn watch(path: &Path) -> Result<(ConfigWatcher, ReloadSignal), WatchError> {
    let (tx, signal) = ReloadSignal::channel();
    let target = path.to_path_buf();
    let file_name = target.file_name().map(|n| n.to_os_string());

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let Ok(event) = res else {
            return;
        };
        if event.kind.is_access() {
            return;
        }
        let touches_config = event
            .paths
            .iter()
            .any(|p| p == &target || (file_name.is_some() && p.file_name() == file_name.as_deref()));
        if touches_config {
            debug!("config change: {:?}", event.kind);
            let _ = tx.send(());
        }
    })?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    watcher.watch(dir, RecursiveMode::NonRecursive)?;

    Ok((
        ConfigWatcher {
            _watcher: watcher,
            path: path.to_path_buf(),
        },
        signal,
    ))
}

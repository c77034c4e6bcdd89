//! Configuration directory watcher for hot reload.
//!
//! The notify callback only forwards change notifications; loading and
//! installing happen on the reload task (see `crate::reload`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// A write-like change to one or more files under the watched directory.
#[derive(Debug, Clone)]
pub struct ConfigChange {
    pub paths: Vec<PathBuf>,
}

/// A watcher that monitors the configuration directory for changes.
pub struct ConfigWatcher {
    dir: PathBuf,
    change_tx: mpsc::UnboundedSender<ConfigChange>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for change notifications.
    pub fn new(dir: &Path) -> (Self, mpsc::UnboundedReceiver<ConfigChange>) {
        let (change_tx, change_rx) = mpsc::unbounded_channel();

        (
            Self {
                dir: dir.to_path_buf(),
                change_tx,
            },
            change_rx,
        )
    }

    /// Start watching the directory on notify's background thread.
    ///
    /// Watching stops when the returned handle is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.change_tx;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if is_write(&event.kind) {
                        tracing::debug!(paths = ?event.paths, kind = ?event.kind, "Config change detected");
                        let _ = tx.send(ConfigChange { paths: event.paths });
                    }
                }
                Err(e) => tracing::error!(error = %e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.dir, RecursiveMode::Recursive)?;

        tracing::info!(dir = %self.dir.display(), "Config watcher started");
        Ok(watcher)
    }
}

/// Creates and content/name modifications count as writes; metadata-only
/// changes, access and removal do not.
fn is_write(kind: &EventKind) -> bool {
    use notify::event::ModifyKind;

    match kind {
        EventKind::Create(_) => true,
        EventKind::Modify(ModifyKind::Metadata(_)) => false,
        EventKind::Modify(_) => true,
        _ => false,
    }
}

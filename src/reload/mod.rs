//! Hot reload of the route table.
//!
//! # Data Flow
//! ```text
//! watcher (notify thread)
//!     → ConfigChange over an unbounded channel
//!     → ReloadController::run (single task)
//!         wait debounce window, drain queued changes
//!         → config::load (blocking pool)
//!         → RouteTable::build
//!         → SharedRouteTable::install
//! ```
//!
//! # Design Decisions
//! - One task owns every reload, so reloads never interleave and a stale
//!   table can never be installed after a fresher one
//! - Bursts of events collapse into one reload
//! - A failed reload logs and keeps the installed table
//! - Request handlers never wait on the controller

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::config::{self, ConfigChange, ConfigError, ConfigWatcher, ServerConfig};
use crate::routing::{RouteTable, SharedRouteTable};

pub use crate::routing::ReloadState;

/// Default window used to coalesce bursts of change events.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum ReloadError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("reload task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Rebuilds and installs the route table when configuration changes.
pub struct ReloadController {
    entry: PathBuf,
    routes: SharedRouteTable,
    listen: String,
    pending_listen: Option<String>,
    debounce: Duration,
}

impl ReloadController {
    /// `current` is the config the installed table was built from.
    pub fn new(entry: impl Into<PathBuf>, current: &ServerConfig, routes: SharedRouteTable) -> Self {
        Self {
            entry: entry.into(),
            routes,
            listen: current.listen.clone(),
            pending_listen: None,
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// State of the table this controller writes to.
    pub fn state(&self) -> ReloadState {
        self.routes.reload_state()
    }

    /// `listen` from the last reloaded file, when it differs from the one
    /// in effect.
    pub fn pending_listen(&self) -> Option<&str> {
        self.pending_listen.as_deref()
    }

    pub fn entry(&self) -> &Path {
        &self.entry
    }

    /// Load, build and install. Returns the new table generation.
    ///
    /// On error the installed table is left untouched.
    pub async fn reload(&mut self) -> Result<u64, ReloadError> {
        let result = {
            let _reloading = self.routes.begin_reload();
            self.rebuild().await
        };

        match result {
            Ok((config, table)) => {
                if config.listen != self.listen {
                    tracing::warn!(
                        current = %self.listen,
                        requested = %config.listen,
                        "Listen address changed; restart to apply it"
                    );
                    self.pending_listen = Some(config.listen);
                } else {
                    self.pending_listen = None;
                }
                let routes = table.len();
                let generation = self.routes.install(table);
                tracing::info!(
                    path = %self.entry.display(),
                    routes,
                    generation,
                    "Configuration reloaded"
                );
                Ok(generation)
            }
            Err(e) => {
                tracing::error!(
                    path = %self.entry.display(),
                    error = %e,
                    "Failed to reload config. Keeping current configuration."
                );
                Err(e)
            }
        }
    }

    async fn rebuild(&self) -> Result<(ServerConfig, RouteTable), ReloadError> {
        let entry = self.entry.clone();
        let config = tokio::task::spawn_blocking(move || config::load(&entry)).await??;
        let table = RouteTable::build(&config);
        Ok((config, table))
    }

    /// Reload on every (coalesced) change until shutdown or until the
    /// change channel closes.
    pub async fn run(
        mut self,
        mut changes: mpsc::UnboundedReceiver<ConfigChange>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::debug!("Reload controller stopping");
                    break;
                }
                change = changes.recv() => {
                    let Some(first) = change else { break };

                    tokio::time::sleep(self.debounce).await;
                    let mut coalesced = 1;
                    while changes.try_recv().is_ok() {
                        coalesced += 1;
                    }

                    tracing::info!(paths = ?first.paths, coalesced, "Config change detected, reloading...");
                    // Errors are logged inside; the old table stays live.
                    let _ = self.reload().await;
                }
            }
        }
    }
}

/// Start watching the entry file's directory and spawn the reload task.
///
/// The watcher lives inside the task and stops with it.
pub fn spawn(
    controller: ReloadController,
    shutdown: broadcast::Receiver<()>,
) -> Result<JoinHandle<()>, notify::Error> {
    let dir = config::config_dir(controller.entry());
    let (watcher, changes) = ConfigWatcher::new(&dir);
    let handle = watcher.run()?;

    Ok(tokio::spawn(async move {
        let _handle = handle;
        controller.run(changes, shutdown).await;
    }))
}

//! The live route table shared between the reload task and request handlers.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::routing::router::RouteTable;

/// Whether a rebuild of the table is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadState {
    /// Serving the last good table.
    Stable,
    /// Rebuilding; the previous table is still live.
    Reloading,
}

/// Single-writer, many-reader handle to the installed [`RouteTable`].
///
/// Readers take a snapshot with [`load`](Self::load) and keep using it for
/// the whole request; an install swaps the pointer and never blocks them.
#[derive(Clone)]
pub struct SharedRouteTable {
    inner: Arc<ArcSwap<RouteTable>>,
    generation: Arc<AtomicU64>,
    reloading: Arc<AtomicBool>,
}

/// Marks the table as [`ReloadState::Reloading`] until dropped.
pub struct ReloadGuard {
    reloading: Arc<AtomicBool>,
}

impl Drop for ReloadGuard {
    fn drop(&mut self) {
        self.reloading.store(false, Ordering::Release);
    }
}

impl SharedRouteTable {
    pub fn new(table: RouteTable) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(table)),
            generation: Arc::new(AtomicU64::new(0)),
            reloading: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Enter [`ReloadState::Reloading`] for the lifetime of the guard.
    pub fn begin_reload(&self) -> ReloadGuard {
        self.reloading.store(true, Ordering::Release);
        ReloadGuard {
            reloading: Arc::clone(&self.reloading),
        }
    }

    pub fn reload_state(&self) -> ReloadState {
        if self.reloading.load(Ordering::Acquire) {
            ReloadState::Reloading
        } else {
            ReloadState::Stable
        }
    }

    /// Snapshot of the currently installed table.
    pub fn load(&self) -> Arc<RouteTable> {
        self.inner.load_full()
    }

    /// Publish a new table, returning its generation.
    pub fn install(&self, table: RouteTable) -> u64 {
        self.inner.store(Arc::new(table));
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Number of successful installs since construction.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for SharedRouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedRouteTable")
            .field("generation", &self.generation())
            .field("state", &self.reload_state())
            .field("routes", &self.inner.load().len())
            .finish()
    }
}

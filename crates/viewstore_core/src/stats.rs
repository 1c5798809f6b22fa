//! Store operation counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Internal atomic counters shared between the façade and the worker.
#[derive(Debug, Default)]
pub(crate) struct StatsInner {
    pub(crate) actions_enqueued: AtomicU64,
    pub(crate) actions_settled: AtomicU64,
    pub(crate) actions_failed: AtomicU64,
    pub(crate) updates_applied: AtomicU64,
    pub(crate) stale_writes_discarded: AtomicU64,
    pub(crate) notifications_delivered: AtomicU64,
}

impl StatsInner {
    pub(crate) fn snapshot(&self) -> StoreStats {
        StoreStats {
            actions_enqueued: self.actions_enqueued.load(Ordering::Relaxed),
            actions_settled: self.actions_settled.load(Ordering::Relaxed),
            actions_failed: self.actions_failed.load(Ordering::Relaxed),
            updates_applied: self.updates_applied.load(Ordering::Relaxed),
            stale_writes_discarded: self.stale_writes_discarded.load(Ordering::Relaxed),
            notifications_delivered: self.notifications_delivered.load(Ordering::Relaxed),
        }
    }
}

/// Statistics about store operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Total actions accepted by `emit`.
    pub actions_enqueued: u64,
    /// Actions whose batch was applied and subscribers notified.
    pub actions_settled: u64,
    /// Actions that terminated with an engine error.
    pub actions_failed: u64,
    /// Path updates installed into the cache.
    pub updates_applied: u64,
    /// Updates discarded by the version guard.
    pub stale_writes_discarded: u64,
    /// Subscription callbacks invoked.
    pub notifications_delivered: u64,
}

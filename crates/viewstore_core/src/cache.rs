//! Versioned snapshot cache.
//!
//! The cache holds the current value and version for every known path.
//! It is written only by the action queue's single in-flight processing
//! step and read concurrently by the UI; a whole batch is installed
//! under one write lock so readers never observe a partially applied
//! batch.

use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;
use viewstore_codec::Value;
use viewstore_protocol::Batch;

/// A versioned raw state value for one path.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Raw structured value.
    pub value: Value,
    /// Version recorded at the last successful write to this path.
    pub version: u64,
}

/// Notification that a path's value changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotice {
    /// Path whose value changed.
    pub path: String,
    /// Version after the change; `0` for a cleared path.
    pub version: u64,
}

/// Result of applying one batch.
#[derive(Debug, Clone, Default)]
pub struct ApplyOutcome {
    /// Paths whose value actually changed, in batch order.
    ///
    /// An update that re-installs an equal value bumps the recorded
    /// version but does not appear here, so downstream notification
    /// skips no-op updates.
    pub changed: Vec<ChangeNotice>,
    /// Updates discarded because their version was not newer than the
    /// path's current version.
    pub discarded: usize,
}

/// The authoritative client-side cache of state slices.
pub struct SnapshotCache {
    entries: RwLock<HashMap<String, Snapshot>>,
}

impl SnapshotCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Applies a batch transactionally.
    ///
    /// All updates install under one write lock: either all of the
    /// batch's path updates are visible to a reader or none are. An
    /// update whose version is not newer than the path's current
    /// version is discarded (expected reordering tolerance, logged at
    /// debug level, never surfaced to callers).
    pub fn apply(&self, batch: &Batch) -> ApplyOutcome {
        let mut outcome = ApplyOutcome::default();
        let mut entries = self.entries.write();

        for update in &batch.updates {
            if let Some(current) = entries.get(&update.path) {
                if update.version <= current.version {
                    debug!(
                        path = %update.path,
                        incoming = update.version,
                        current = current.version,
                        "discarding stale write"
                    );
                    outcome.discarded += 1;
                    continue;
                }
            }

            match &update.value {
                Some(value) => {
                    let value_changed = entries
                        .get(&update.path)
                        .map(|current| current.value != *value)
                        .unwrap_or(true);
                    entries.insert(
                        update.path.clone(),
                        Snapshot {
                            value: value.clone(),
                            version: update.version,
                        },
                    );
                    if value_changed {
                        outcome.changed.push(ChangeNotice {
                            path: update.path.clone(),
                            version: update.version,
                        });
                    }
                }
                None => {
                    // Clearing update: only a removal that actually
                    // removed something counts as a change.
                    if entries.remove(&update.path).is_some() {
                        outcome.changed.push(ChangeNotice {
                            path: update.path.clone(),
                            version: 0,
                        });
                    }
                }
            }
        }

        outcome
    }

    /// Reads the current snapshot for a path, or `None` if absent.
    pub fn read(&self, path: &str) -> Option<Snapshot> {
        self.entries.read().get(path).cloned()
    }

    /// Reads several paths under one consistent snapshot.
    ///
    /// All entries come from the same read lock acquisition, so the
    /// result reflects a single point between batch applications,
    /// never a partially applied batch.
    pub fn read_many(&self, paths: &[&str]) -> Vec<Option<Snapshot>> {
        let entries = self.entries.read();
        paths.iter().map(|p| entries.get(*p).cloned()).collect()
    }

    /// Returns the recorded version for a path.
    pub fn version(&self, path: &str) -> Option<u64> {
        self.entries.read().get(path).map(|s| s.version)
    }

    /// Number of populated paths.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if no path is populated.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns all populated paths (unordered).
    pub fn paths(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}

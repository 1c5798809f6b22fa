//! Snapshot batches produced by the engine.

use viewstore_codec::Value;

/// One path update within a batch.
///
/// `value: None` is a clearing update: the path is removed from the
/// cache (e.g. logout clearing `timeline/feed`).
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotUpdate {
    /// Path of the state slice.
    pub path: String,
    /// Version stamped by the engine: the sequence number of the action
    /// that produced this update. Strictly increases per engine.
    pub version: u64,
    /// New snapshot value, or `None` to clear the path.
    pub value: Option<Value>,
}

impl SnapshotUpdate {
    /// Creates an update that installs a new snapshot value.
    pub fn put(path: impl Into<String>, version: u64, value: Value) -> Self {
        Self {
            path: path.into(),
            version,
            value: Some(value),
        }
    }

    /// Creates a clearing update that removes the path.
    pub fn clear(path: impl Into<String>, version: u64) -> Self {
        Self {
            path: path.into(),
            version,
            value: None,
        }
    }
}

/// The set of snapshot updates produced by one completed action.
///
/// A batch may touch zero, one, or many paths; the cache applies it as
/// one indivisible step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    /// Updates in engine emission order.
    pub updates: Vec<SnapshotUpdate>,
}

impl Batch {
    /// Creates a batch from updates.
    pub fn new(updates: Vec<SnapshotUpdate>) -> Self {
        Self { updates }
    }

    /// Creates an empty batch (the action changed no state).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if the batch touches no paths.
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Number of path updates in the batch.
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    /// Returns true if the batch contains an update for `path`.
    pub fn touches(&self, path: &str) -> bool {
        self.updates.iter().any(|u| u.path == path)
    }
}

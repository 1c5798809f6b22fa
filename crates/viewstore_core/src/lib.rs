//! # ViewStore Core
//!
//! Client-side state synchronization store.
//!
//! This crate provides:
//! - Snapshot cache with per-path versioning and atomic batch apply
//! - Decoder registry for typed projection of raw snapshots
//! - Subscription registry with exact-path change notification
//! - Action queue serializing engine calls (FIFO, one in flight)
//! - Engine bridge trait to the external authoritative engine
//! - Store façade: `emit` / `get` / `get_sync` / `subscribe`
//!
//! ## Architecture
//!
//! UI calls `emit(action, payload)` → the queue serializes → the engine
//! bridge performs the call → the engine returns a batch of path
//! updates → the cache applies the batch atomically, bumping versions →
//! subscribers of changed paths are notified → `get_sync` callers
//! blocked on the drain are released.
//!
//! ## Key invariants
//!
//! - Per-path versions strictly increase; stale writes are discarded
//! - A batch is visible all-or-nothing, never partially
//! - Actions apply in emission order per store instance
//! - Notifications fire only after the full batch is installed
//! - The store never synthesizes state; every snapshot came from the
//!   engine

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod config;
mod decode;
mod engine;
mod error;
mod queue;
mod stats;
mod store;
mod subscriptions;

pub use cache::{ApplyOutcome, ChangeNotice, Snapshot, SnapshotCache};
pub use config::StoreConfig;
pub use decode::{DecodedValue, DecoderRegistry, PathPattern};
pub use engine::{Engine, MockEngine};
pub use error::{StoreError, StoreResult};
pub use queue::{ActionPhase, ActionQueue, ActionTicket};
pub use stats::StoreStats;
pub use store::Store;
pub use subscriptions::{SubscriptionHandle, SubscriptionRegistry};

// The codec and protocol vocabulary is part of the public surface.
pub use viewstore_codec::{DecodeError, DecodeResult, FromValue, Value};
pub use viewstore_protocol::{
    ActionRequest, Batch, EngineError, EngineResult, SnapshotUpdate, BOOTSTRAP_ACTION,
};

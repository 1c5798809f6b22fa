//! Store façade: the public surface composing cache, registries,
//! queue, and engine bridge.

use crate::cache::{ChangeNotice, Snapshot, SnapshotCache};
use crate::config::StoreConfig;
use crate::decode::{DecodedValue, DecoderRegistry};
use crate::engine::Engine;
use crate::error::StoreResult;
use crate::queue::{ActionQueue, ActionTicket};
use crate::stats::{StatsInner, StoreStats};
use crate::subscriptions::{SubscriptionHandle, SubscriptionRegistry};
use std::any::Any;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::debug;
use viewstore_codec::{DecodeResult, FromValue, Value};
use viewstore_protocol::ActionRequest;

/// A client-side state synchronization store.
///
/// One store owns one snapshot cache, one action queue, and one engine
/// bridge. Construct stores explicitly and thread them to consumers;
/// tests build as many independent instances as they need.
///
/// Reads (`get`) never block and may be stale relative to an action the
/// caller just emitted; `get_sync` is the deterministic post-action
/// read and must only be called from contexts that tolerate blocking.
pub struct Store {
    config: StoreConfig,
    cache: Arc<SnapshotCache>,
    decoders: Arc<DecoderRegistry>,
    subscriptions: Arc<SubscriptionRegistry>,
    queue: ActionQueue,
    stats: Arc<StatsInner>,
}

impl Store {
    /// Creates a store bound to an engine.
    pub fn new(config: StoreConfig, engine: Arc<dyn Engine>) -> Self {
        let cache = Arc::new(SnapshotCache::new());
        let subscriptions = Arc::new(SubscriptionRegistry::new());
        let stats = Arc::new(StatsInner::default());
        let queue = ActionQueue::start(
            engine,
            Arc::clone(&cache),
            Arc::clone(&subscriptions),
            Arc::clone(&stats),
        );
        debug!(label = %config.label, "store created");
        Self {
            config,
            cache,
            decoders: Arc::new(DecoderRegistry::new()),
            subscriptions,
            queue,
            stats,
        }
    }

    /// Creates a store with the default configuration.
    pub fn with_engine(engine: Arc<dyn Engine>) -> Self {
        Self::new(StoreConfig::default(), engine)
    }

    /// Emits the configured bootstrap action.
    ///
    /// Must run before any path is expected to be populated; reading a
    /// path before initialization returns `None`, not an error.
    pub fn initialize(&self) -> StoreResult<ActionTicket> {
        self.emit(self.config.bootstrap_action.clone(), None)
    }

    /// Dispatches an action and returns immediately.
    ///
    /// The cache updates asynchronously when the queue drains to this
    /// action; use the ticket or `get_sync` for a deterministic
    /// post-action read.
    pub fn emit(
        &self,
        name: impl Into<String>,
        payload: Option<Value>,
    ) -> StoreResult<ActionTicket> {
        let request = ActionRequest {
            name: name.into(),
            payload,
        };
        let ticket = self.queue.enqueue(request)?;
        self.stats.actions_enqueued.fetch_add(1, Ordering::Relaxed);
        Ok(ticket)
    }

    /// Returns the last cached value for a path, decoded.
    ///
    /// Never waits for in-flight actions. `None` means the path is
    /// absent (e.g. before the bootstrap action completed).
    pub fn get(&self, path: &str) -> StoreResult<Option<DecodedValue>> {
        match self.cache.read(path) {
            None => Ok(None),
            Some(snapshot) => Ok(Some(self.decoders.decode(path, &snapshot.value)?)),
        }
    }

    /// Blocks until the action queue has fully drained, then reads.
    ///
    /// All previously enqueued actions reach `settled` or `failed`
    /// before the read happens. A blocking primitive: call it from test
    /// harnesses or worker threads, never from the render context.
    pub fn get_sync(&self, path: &str) -> StoreResult<Option<DecodedValue>> {
        self.queue.wait_idle(self.config.get_sync_timeout)?;
        self.get(path)
    }

    /// Returns the raw versioned snapshot for a path, undecoded.
    pub fn snapshot(&self, path: &str) -> Option<Snapshot> {
        self.cache.read(path)
    }

    /// Returns raw snapshots for several paths as one consistent read.
    ///
    /// Use this when a render needs multiple slices that must be
    /// coherent with each other (e.g. route plus auth).
    pub fn snapshots(&self, paths: &[&str]) -> Vec<Option<Snapshot>> {
        self.cache.read_many(paths)
    }

    /// Subscribes a callback to changes of an exact path.
    ///
    /// Release the handle on teardown; dropping it unsubscribes.
    pub fn subscribe<F>(&self, path: impl Into<String>, callback: F) -> SubscriptionHandle
    where
        F: Fn(&ChangeNotice) + Send + Sync + 'static,
    {
        self.subscriptions.subscribe(path, callback)
    }

    /// Registers a decode function for a path pattern.
    pub fn register_decoder<F>(&self, pattern: &str, decode: F)
    where
        F: Fn(&Value) -> DecodeResult<DecodedValue> + Send + Sync + 'static,
    {
        self.decoders.register(pattern, decode);
    }

    /// Registers a typed model for a path pattern.
    pub fn register_typed<T>(&self, pattern: &str)
    where
        T: FromValue + Any + Send + Sync,
    {
        self.decoders.register_typed::<T>(pattern);
    }

    /// Blocks until every previously enqueued action is terminal.
    pub fn wait_idle(&self) -> StoreResult<()> {
        self.queue.wait_idle(self.config.get_sync_timeout)
    }

    /// Operation counters for this store instance.
    pub fn stats(&self) -> StoreStats {
        self.stats.snapshot()
    }

    /// The configuration this store was built with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Closes the store: remaining actions drain, the worker joins, and
    /// further `emit` calls return [`StoreError::Closed`].
    ///
    /// [`StoreError::Closed`]: crate::StoreError::Closed
    pub fn close(&self) {
        debug!(label = %self.config.label, "closing store");
        self.queue.close();
    }
}

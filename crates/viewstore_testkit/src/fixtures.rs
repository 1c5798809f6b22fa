//! Store fixtures with the demo decoders pre-registered.

use crate::engine::DemoEngine;
use crate::models::{AuthState, ComposeState, FeedState, Profile};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use viewstore_codec::Value;
use viewstore_core::{ActionTicket, Store, StoreConfig};

/// A store wired to a fresh [`DemoEngine`], with the demo models
/// registered as typed decoders.
pub struct DemoStore {
    /// The store under test.
    pub store: Store,
    /// The engine behind it, for direct inspection.
    pub engine: Arc<DemoEngine>,
}

impl DemoStore {
    /// Creates a store without running the bootstrap action.
    pub fn new() -> Self {
        let engine = Arc::new(DemoEngine::new());
        let config = StoreConfig::new("demo-store")
            .with_get_sync_timeout(Duration::from_secs(5));
        let store = Store::new(config, Arc::clone(&engine) as Arc<dyn viewstore_core::Engine>);

        store.register_typed::<AuthState>("auth/state");
        store.register_typed::<FeedState>("timeline/feed");
        store.register_typed::<ComposeState>("compose/state");
        store.register_typed::<Profile>("profile/{username}");

        Self { store, engine }
    }

    /// Creates a store and runs the bootstrap action to completion.
    pub fn initialized() -> Self {
        let fixture = Self::new();
        fixture
            .store
            .initialize()
            .expect("initialize should enqueue")
            .wait()
            .expect("bootstrap action should settle");
        fixture
    }

    /// Emits `login` for a username and waits for it to settle.
    pub fn login(&self, username: &str) -> ActionTicket {
        let ticket = self
            .store
            .emit(
                "login",
                Some(Value::map(vec![(
                    "username".to_string(),
                    Value::from(username),
                )])),
            )
            .expect("login should enqueue");
        ticket.wait().expect("login should settle");
        ticket
    }

    /// Reads a path without waiting and downcasts to the typed model.
    pub fn get_as<T: Any + Send + Sync>(&self, path: &str) -> Option<Arc<T>> {
        self.store
            .get(path)
            .expect("decode should succeed")
            .and_then(|decoded| decoded.downcast::<T>())
    }

    /// Drains the queue, then reads and downcasts to the typed model.
    pub fn get_sync_as<T: Any + Send + Sync>(&self, path: &str) -> Option<Arc<T>> {
        self.store
            .get_sync(path)
            .expect("decode should succeed")
            .and_then(|decoded| decoded.downcast::<T>())
    }
}

impl Default for DemoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for DemoStore {
    type Target = Store;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Runs a test against an initialized demo store.
///
/// # Example
///
/// ```rust,ignore
/// use viewstore_testkit::with_demo_store;
///
/// #[test]
/// fn my_test() {
///     with_demo_store(|demo| {
///         demo.login("alice");
///         // ... assertions
///     });
/// }
/// ```
pub fn with_demo_store<F, R>(f: F) -> R
where
    F: FnOnce(&DemoStore) -> R,
{
    let fixture = DemoStore::initialized();
    f(&fixture)
}

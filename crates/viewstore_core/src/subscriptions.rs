//! Subscription registry for change notifications.
//!
//! Observers subscribe to exact paths; notification cost is
//! proportional to actual listeners, not path-tree traversal. A
//! subscription is released when its handle is dropped (or explicitly
//! via [`SubscriptionHandle::release`]) so torn-down UI state never
//! leaks callbacks.

use crate::cache::ChangeNotice;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

type Callback = Arc<dyn Fn(&ChangeNotice) + Send + Sync>;

#[derive(Default)]
struct Inner {
    by_path: HashMap<String, Vec<(u64, Callback)>>,
}

/// Tracks which observers care about which paths and delivers change
/// notifications to them.
pub struct SubscriptionRegistry {
    inner: Arc<RwLock<Inner>>,
    next_id: AtomicU64,
}

impl SubscriptionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Subscribes a callback to an exact path.
    ///
    /// The callback runs on the store's worker thread after a batch
    /// that changed the path is fully installed. Keep it cheap: read
    /// the store and schedule a re-render, nothing more.
    pub fn subscribe<F>(&self, path: impl Into<String>, callback: F) -> SubscriptionHandle
    where
        F: Fn(&ChangeNotice) + Send + Sync + 'static,
    {
        let path = path.into();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .write()
            .by_path
            .entry(path.clone())
            .or_default()
            .push((id, Arc::new(callback)));

        SubscriptionHandle {
            registry: Arc::downgrade(&self.inner),
            path,
            id,
        }
    }

    /// Notifies every callback subscribed to each changed path.
    ///
    /// Exact-path matching only. Callbacks are invoked outside the
    /// registry lock, so a callback may subscribe or release
    /// reentrantly. Returns the number of callbacks invoked.
    pub fn notify(&self, changes: &[ChangeNotice]) -> usize {
        let mut delivered = 0;
        for change in changes {
            let callbacks: Vec<Callback> = {
                let inner = self.inner.read();
                match inner.by_path.get(&change.path) {
                    Some(entries) => entries.iter().map(|(_, cb)| Arc::clone(cb)).collect(),
                    None => continue,
                }
            };
            for callback in callbacks {
                callback(change);
                delivered += 1;
            }
        }
        delivered
    }

    /// Number of subscriptions for one path.
    pub fn subscriber_count(&self, path: &str) -> usize {
        self.inner
            .read()
            .by_path
            .get(path)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Total number of live subscriptions.
    pub fn len(&self) -> usize {
        self.inner.read().by_path.values().map(Vec::len).sum()
    }

    /// Returns true if nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for one subscription; dropping it unregisters the callback.
pub struct SubscriptionHandle {
    registry: Weak<RwLock<Inner>>,
    path: String,
    id: u64,
}

impl SubscriptionHandle {
    /// Explicitly releases the subscription.
    ///
    /// Equivalent to dropping the handle.
    pub fn release(self) {
        // Drop does the unregistration.
    }

    /// The path this subscription observes.
    pub fn path(&self) -> &str {
        &self.path
    }

    fn unregister(&self) {
        if let Some(inner) = self.registry.upgrade() {
            let mut inner = inner.write();
            if let Some(entries) = inner.by_path.get_mut(&self.path) {
                entries.retain(|(id, _)| *id != self.id);
                if entries.is_empty() {
                    inner.by_path.remove(&self.path);
                }
            }
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.unregister();
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("path", &self.path)
            .field("id", &self.id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn notice(path: &str) -> ChangeNotice {
        ChangeNotice {
            path: path.to_string(),
            version: 1,
        }
    }

    #[test]
    fn notify_reaches_exact_subscribers() {
        let registry = SubscriptionRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = Arc::clone(&seen);
        let _handle = registry.subscribe("auth/state", move |change| {
            seen_clone.lock().push(change.path.clone());
        });

        let delivered = registry.notify(&[notice("auth/state"), notice("timeline/feed")]);
        assert_eq!(delivered, 1);
        assert_eq!(seen.lock().as_slice(), ["auth/state"]);
    }

    #[test]
    fn no_prefix_matching() {
        let registry = SubscriptionRegistry::new();
        let seen = Arc::new(Mutex::new(0usize));

        let seen_clone = Arc::clone(&seen);
        let _handle = registry.subscribe("timeline", move |_| {
            *seen_clone.lock() += 1;
        });

        registry.notify(&[notice("timeline/feed")]);
        assert_eq!(*seen.lock(), 0);
    }

    #[test]
    fn multiple_subscribers_per_path() {
        let registry = SubscriptionRegistry::new();
        let count = Arc::new(Mutex::new(0usize));

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let count = Arc::clone(&count);
                registry.subscribe("auth/state", move |_| {
                    *count.lock() += 1;
                })
            })
            .collect();

        assert_eq!(registry.subscriber_count("auth/state"), 3);
        let delivered = registry.notify(&[notice("auth/state")]);
        assert_eq!(delivered, 3);
        assert_eq!(*count.lock(), 3);
        drop(handles);
    }

    #[test]
    fn release_unregisters() {
        let registry = SubscriptionRegistry::new();
        let handle = registry.subscribe("auth/state", |_| {});
        assert_eq!(registry.subscriber_count("auth/state"), 1);

        handle.release();
        assert_eq!(registry.subscriber_count("auth/state"), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn drop_unregisters() {
        let registry = SubscriptionRegistry::new();
        {
            let _handle = registry.subscribe("auth/state", |_| {});
            assert_eq!(registry.len(), 1);
        }
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn handle_outliving_registry_is_harmless() {
        let registry = SubscriptionRegistry::new();
        let handle = registry.subscribe("auth/state", |_| {});
        drop(registry);
        handle.release();
    }

    #[test]
    fn reentrant_release_from_callback() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let slot: Arc<Mutex<Option<SubscriptionHandle>>> = Arc::new(Mutex::new(None));

        let slot_clone = Arc::clone(&slot);
        let handle = registry.subscribe("once", move |_| {
            // One-shot subscriber: releases itself on first delivery.
            slot_clone.lock().take();
        });
        *slot.lock() = Some(handle);

        registry.notify(&[notice("once")]);
        assert_eq!(registry.subscriber_count("once"), 0);
    }
}

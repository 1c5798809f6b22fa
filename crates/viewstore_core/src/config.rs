//! Configuration for a store instance.

use std::time::Duration;
use viewstore_protocol::BOOTSTRAP_ACTION;

/// Configuration for a store instance.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Label used in the worker thread name and log events.
    pub label: String,
    /// Name of the bootstrap action dispatched by `initialize`.
    pub bootstrap_action: String,
    /// Upper bound for the `get_sync` drain wait.
    ///
    /// `None` waits indefinitely, which matches the blocking-read
    /// contract; tests usually set a bound so an engine bug cannot hang
    /// the harness.
    pub get_sync_timeout: Option<Duration>,
}

impl StoreConfig {
    /// Creates a configuration with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            bootstrap_action: BOOTSTRAP_ACTION.to_string(),
            get_sync_timeout: None,
        }
    }

    /// Sets the bootstrap action name.
    pub fn with_bootstrap_action(mut self, name: impl Into<String>) -> Self {
        self.bootstrap_action = name.into();
        self
    }

    /// Sets the `get_sync` timeout.
    pub fn with_get_sync_timeout(mut self, timeout: Duration) -> Self {
        self.get_sync_timeout = Some(timeout);
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new("store")
    }
}

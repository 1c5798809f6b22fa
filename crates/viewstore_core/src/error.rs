//! Error types for the store.

use thiserror::Error;
use viewstore_codec::DecodeError;
use viewstore_protocol::EngineError;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the store façade.
///
/// No variant is fatal to the store: a failed action leaves the cache
/// at its pre-action values and the queue proceeds to the next action.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A snapshot could not be decoded for the requested path.
    ///
    /// Scoped to that path; other paths stay readable.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The engine rejected or failed an action.
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// The store has been closed; no further actions are accepted.
    #[error("store is closed")]
    Closed,

    /// `get_sync` gave up waiting for the action queue to drain.
    #[error("timed out waiting for the action queue to drain")]
    Timeout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_conversion() {
        let err: StoreError = DecodeError::invalid("bad payload").into();
        assert!(matches!(err, StoreError::Decode(_)));

        let err: StoreError = EngineError::Closed.into();
        assert!(matches!(err, StoreError::Engine(_)));
    }

    #[test]
    fn error_display() {
        assert_eq!(StoreError::Closed.to_string(), "store is closed");
        assert_eq!(
            StoreError::Timeout.to_string(),
            "timed out waiting for the action queue to drain"
        );
    }
}

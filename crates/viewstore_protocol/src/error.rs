//! Error types for engine calls.

use thiserror::Error;

/// Result type for engine calls.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors the engine bridge can surface for one action.
///
/// `Clone` so a completion ticket can both hold the terminal error and
/// hand a copy to every waiter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The engine executed the action and rejected it.
    #[error("engine rejected action `{action}`: {message}")]
    Rejected {
        /// Name of the rejected action.
        action: String,
        /// Engine-provided reason.
        message: String,
    },

    /// The call itself failed: engine crashed, unreachable, or the
    /// host-side bridge broke.
    #[error("engine transport failed: {0}")]
    Transport(String),

    /// The engine replied with something the protocol cannot parse.
    #[error("malformed engine response: {0}")]
    MalformedResponse(String),

    /// The engine has been shut down.
    #[error("engine is closed")]
    Closed,
}

impl EngineError {
    /// Creates a rejection error for a named action.
    pub fn rejected(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            action: action.into(),
            message: message.into(),
        }
    }

    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a malformed-response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }
}

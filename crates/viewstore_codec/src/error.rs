//! Error types for decoding.

use thiserror::Error;

/// Result type for decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Errors that can occur when decoding a snapshot into a typed value.
///
/// Decode errors are scoped to a single path: a malformed snapshot for
/// one path never poisons reads of other paths.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The snapshot root was not a map, but field access was requested.
    #[error("expected map, got {actual}")]
    ExpectedMap {
        /// Kind of value actually found.
        actual: &'static str,
    },

    /// A required field was present but had the wrong shape.
    #[error("field `{field}`: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Name of the offending field.
        field: String,
        /// Kind of value the decoder required.
        expected: &'static str,
        /// Kind of value actually found.
        actual: &'static str,
    },

    /// A payload crossing the foreign-call boundary was not valid JSON.
    #[error("invalid JSON payload: {0}")]
    Json(String),

    /// Decoder-specific failure with a custom message.
    #[error("{0}")]
    Invalid(String),
}

impl DecodeError {
    /// Creates a type-mismatch error for a named field.
    pub fn type_mismatch(
        field: impl Into<String>,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected,
            actual,
        }
    }

    /// Creates a decoder-specific error with a custom message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

//! Defensive field access and the typed decode contract.
//!
//! Snapshots can arrive with partial or older shapes than the models a
//! host was generated against, so field access never fails on absence:
//! - `opt_*` accessors always succeed, substituting documented defaults
//!   (empty string, zero, `false`, empty sequence)
//! - `req_*` accessors also default on absence, but reject a field that
//!   is *present* with the wrong shape
//!
//! Accessors have no side effects; decoding the same payload twice
//! yields the same defaulted value both times.

use crate::error::{DecodeError, DecodeResult};
use crate::value::Value;

/// Contract satisfied by every generated typed model.
///
/// Given a raw structured payload, produce a typed value filling absent
/// fields with defaults, and signal a [`DecodeError`] only when a
/// required field is present but of the wrong shape.
pub trait FromValue: Sized {
    /// Decodes a typed value from a raw snapshot payload.
    fn from_value(value: &Value) -> DecodeResult<Self>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> DecodeResult<Self> {
        Ok(value.clone())
    }
}

impl Value {
    fn require_map(&self) -> DecodeResult<&[(String, Value)]> {
        self.as_map().ok_or(DecodeError::ExpectedMap {
            actual: self.kind(),
        })
    }

    /// Returns a field only if it is present and non-null.
    ///
    /// This is the accessor for optional sub-structures ("user is
    /// absent" is distinct from "user has defaulted fields").
    pub fn opt_field(&self, field: &str) -> Option<&Value> {
        match self.get(field) {
            Some(Value::Null) | None => None,
            Some(v) => Some(v),
        }
    }

    /// Required text field: defaults to `""` when absent, errors when
    /// present with a non-text shape.
    pub fn req_text(&self, field: &str) -> DecodeResult<String> {
        self.require_map()?;
        match self.get(field) {
            None | Some(Value::Null) => Ok(String::new()),
            Some(Value::Text(s)) => Ok(s.clone()),
            Some(other) => Err(DecodeError::type_mismatch(field, "text", other.kind())),
        }
    }

    /// Required integer field: defaults to `0` when absent, errors when
    /// present with a non-integer shape.
    pub fn req_i64(&self, field: &str) -> DecodeResult<i64> {
        self.require_map()?;
        match self.get(field) {
            None | Some(Value::Null) => Ok(0),
            Some(Value::Integer(n)) => Ok(*n),
            Some(other) => Err(DecodeError::type_mismatch(field, "integer", other.kind())),
        }
    }

    /// Required boolean field: defaults to `false` when absent, errors
    /// when present with a non-boolean shape.
    pub fn req_bool(&self, field: &str) -> DecodeResult<bool> {
        self.require_map()?;
        match self.get(field) {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(DecodeError::type_mismatch(field, "bool", other.kind())),
        }
    }

    /// Required array field: defaults to an empty sequence when absent,
    /// errors when present with a non-array shape.
    pub fn req_array(&self, field: &str) -> DecodeResult<Vec<Value>> {
        self.require_map()?;
        match self.get(field) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items.clone()),
            Some(other) => Err(DecodeError::type_mismatch(field, "array", other.kind())),
        }
    }

    /// Optional text field: any absent or mismatched value becomes `""`.
    pub fn opt_text(&self, field: &str) -> String {
        match self.get(field) {
            Some(Value::Text(s)) => s.clone(),
            _ => String::new(),
        }
    }

    /// Optional integer field: any absent or mismatched value becomes `0`.
    pub fn opt_i64(&self, field: &str) -> i64 {
        match self.get(field) {
            Some(Value::Integer(n)) => *n,
            _ => 0,
        }
    }

    /// Optional boolean field: any absent or mismatched value becomes `false`.
    pub fn opt_bool(&self, field: &str) -> bool {
        match self.get(field) {
            Some(Value::Bool(b)) => *b,
            _ => false,
        }
    }

    /// Optional array field: any absent or mismatched value becomes empty.
    pub fn opt_array(&self, field: &str) -> Vec<Value> {
        match self.get(field) {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        }
    }
}

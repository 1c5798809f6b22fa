//! Action requests dispatched to the engine.

use viewstore_codec::Value;

/// Well-known name of the bootstrap action.
///
/// Every store instance dispatches this action before any path is
/// expected to be populated.
pub const BOOTSTRAP_ACTION: &str = "initialize";

/// A named request with optional payload dispatched to the engine.
///
/// Actions are opaque to the store beyond routing: the engine owns
/// their semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    /// Action name (e.g. `"login"`, `"create-tweet"`).
    pub name: String,
    /// Optional structured payload.
    pub payload: Option<Value>,
}

impl ActionRequest {
    /// Creates a request with no payload.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: None,
        }
    }

    /// Creates a request with a payload.
    pub fn with_payload(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload: Some(payload),
        }
    }

    /// Creates the bootstrap request.
    pub fn bootstrap() -> Self {
        Self::new(BOOTSTRAP_ACTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_constructors() {
        let r = ActionRequest::new("logout");
        assert_eq!(r.name, "logout");
        assert!(r.payload.is_none());

        let r = ActionRequest::with_payload(
            "login",
            Value::map(vec![("username".to_string(), Value::from("alice"))]),
        );
        assert_eq!(r.name, "login");
        assert_eq!(r.payload.unwrap().req_text("username").unwrap(), "alice");

        assert_eq!(ActionRequest::bootstrap().name, BOOTSTRAP_ACTION);
    }
}

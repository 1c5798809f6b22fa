//! JSON renderings of the engine call contract.
//!
//! Where the call crosses a foreign host boundary, requests and
//! responses travel as JSON strings:
//!
//! - request: `{"action": "login", "payload": {...}}` (payload omitted
//!   when absent)
//! - success: `{"updates": [{"path": "...", "version": 3, "value": {...}}]}`
//!   (a null or missing `"value"` is a clearing update)
//! - failure: `{"error": {"action": "...", "message": "..."}}`

use crate::action::ActionRequest;
use crate::batch::{Batch, SnapshotUpdate};
use crate::error::{EngineError, EngineResult};
use viewstore_codec::{DecodeResult, Value};

/// The engine's reply for one action.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineResponse {
    /// The action completed; apply these updates.
    Updates(Batch),
    /// The action failed.
    Error(EngineError),
}

/// Encodes a request as a JSON string.
pub fn encode_request(request: &ActionRequest) -> String {
    let mut pairs = vec![("action".to_string(), Value::from(request.name.as_str()))];
    if let Some(payload) = &request.payload {
        pairs.push(("payload".to_string(), payload.clone()));
    }
    Value::map(pairs).to_json_string()
}

/// Decodes a request from a JSON string.
///
/// Used by host-side engine adapters that receive the request across
/// the foreign boundary.
pub fn decode_request(input: &str) -> DecodeResult<ActionRequest> {
    let value = Value::from_json_str(input)?;
    let name = value.req_text("action")?;
    if name.is_empty() {
        return Err(viewstore_codec::DecodeError::invalid(
            "request has no action name",
        ));
    }
    Ok(ActionRequest {
        name,
        payload: value.opt_field("payload").cloned(),
    })
}

/// Encodes a response as a JSON string.
pub fn encode_response(response: &EngineResponse) -> String {
    match response {
        EngineResponse::Updates(batch) => {
            let updates: Vec<Value> = batch
                .updates
                .iter()
                .map(|u| {
                    Value::map(vec![
                        ("path".to_string(), Value::from(u.path.as_str())),
                        ("version".to_string(), Value::Integer(u.version as i64)),
                        ("value".to_string(), Value::from(u.value.clone())),
                    ])
                })
                .collect();
            Value::map(vec![("updates".to_string(), Value::Array(updates))]).to_json_string()
        }
        EngineResponse::Error(error) => {
            let (action, message) = match error {
                EngineError::Rejected { action, message } => (action.clone(), message.clone()),
                other => (String::new(), other.to_string()),
            };
            let error_value = Value::map(vec![
                ("action".to_string(), Value::from(action)),
                ("message".to_string(), Value::from(message)),
            ]);
            Value::map(vec![("error".to_string(), error_value)]).to_json_string()
        }
    }
}

/// Decodes a response from a JSON string.
///
/// Returns the engine's rejection as an [`EngineError::Rejected`], and
/// any shape the protocol cannot parse as
/// [`EngineError::MalformedResponse`].
pub fn decode_response(input: &str) -> EngineResult<Batch> {
    let value =
        Value::from_json_str(input).map_err(|e| EngineError::malformed(e.to_string()))?;

    if let Some(error) = value.opt_field("error") {
        let message = error.opt_text("message");
        let message = if message.is_empty() {
            "engine error".to_string()
        } else {
            message
        };
        return Err(EngineError::Rejected {
            action: error.opt_text("action"),
            message,
        });
    }

    let Some(updates) = value.get("updates").and_then(Value::as_array) else {
        return Err(EngineError::malformed(
            "response has neither `updates` nor `error`",
        ));
    };

    let mut batch = Vec::with_capacity(updates.len());
    for update in updates {
        let path = update.opt_text("path");
        if path.is_empty() {
            return Err(EngineError::malformed("update has no path"));
        }
        let version = update
            .get("version")
            .and_then(Value::as_integer)
            .and_then(|n| u64::try_from(n).ok())
            .ok_or_else(|| EngineError::malformed("update has no valid version"))?;
        batch.push(SnapshotUpdate {
            path,
            version,
            value: update.opt_field("value").cloned(),
        });
    }

    Ok(Batch::new(batch))
}

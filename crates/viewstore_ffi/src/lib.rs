//! # ViewStore FFI
//!
//! Stable C ABI for ViewStore host bindings (Kotlin, Swift, Dart).
//!
//! This crate provides:
//! - C-compatible function exports over the store façade
//! - An extern engine callback so the host links its native engine
//! - Memory ownership conventions and string buffers
//! - Error code mapping with a thread-local last-error message
//!
//! Payloads and snapshots cross the boundary as null-terminated JSON
//! strings; host bindings perform type marshalling only. The queue,
//! cache, and versioning logic live exclusively in `viewstore_core`;
//! bindings must never re-implement them.

mod engine;
mod error;
mod store;
mod strings;

pub use engine::{CallbackEngine, VsEngineCallbacks};
pub use error::{vs_last_error_message, VsResult};
pub use store::{VsChangeCallback, VsStoreHandle, VsSubscriptionHandle};
pub use strings::VsString;

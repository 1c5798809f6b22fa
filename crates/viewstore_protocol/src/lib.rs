//! # ViewStore Protocol
//!
//! Engine call contract types for ViewStore.
//!
//! This crate provides:
//! - [`ActionRequest`] - a named intent with optional payload
//! - [`SnapshotUpdate`] and [`Batch`] - the engine's reply for one action
//! - [`EngineError`] - how the engine signals rejection or failure
//! - JSON renderings of the request/response pair, used where the call
//!   crosses the foreign host boundary
//!
//! The engine processes one request to completion before accepting the
//! next; a single response may carry updates for many paths (a login
//! reply can update route, auth, and timeline in one batch).

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod action;
mod batch;
mod error;
mod wire;

pub use action::{ActionRequest, BOOTSTRAP_ACTION};
pub use batch::{Batch, SnapshotUpdate};
pub use error::{EngineError, EngineResult};
pub use wire::{decode_request, decode_response, encode_request, encode_response, EngineResponse};

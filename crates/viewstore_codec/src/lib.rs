//! # ViewStore Codec
//!
//! Dynamic structured values and defensive decoding for ViewStore.
//!
//! This crate provides:
//! - A dynamic [`Value`] tree for engine payloads and snapshots
//! - Defensive field accessors that fill absent fields with defaults
//! - The [`FromValue`] contract that generated typed models satisfy
//! - JSON interop for the foreign-call boundary
//!
//! Decoding is deliberately tolerant of partial or older payload shapes:
//! an absent field resolves to its documented default (empty string,
//! zero, `false`, empty sequence) and only a *required* field that is
//! present with the wrong shape produces a [`DecodeError`].

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod fields;
mod json;
mod value;

pub use error::{DecodeError, DecodeResult};
pub use fields::FromValue;
pub use value::Value;

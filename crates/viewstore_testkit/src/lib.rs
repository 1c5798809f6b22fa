//! # ViewStore Testkit
//!
//! Test utilities for ViewStore.
//!
//! This crate provides:
//! - [`DemoEngine`] - an in-process reference engine implementing the
//!   demo social-feed domain used by scenario tests
//! - Typed demo models satisfying the decode contract
//! - Store fixtures with the demo decoders pre-registered
//! - Proptest generators for arbitrary payload values

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod engine;
mod fixtures;
mod generators;
mod models;

pub use engine::{DemoEngine, CONTENT_LIMIT};
pub use fixtures::{with_demo_store, DemoStore};
pub use generators::{map_value, path, scalar_value, value};
pub use models::{AuthPhase, AuthState, ComposeState, FeedState, Profile, Tweet, UserRef};

//! Core types and trait definitions for the Kindred matching engine.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod engine;
pub mod error;
pub mod matching;
pub mod onboarding;
pub mod profile;
pub mod question;
pub mod scorer;
pub mod similarity;
pub mod store;

pub use error::{Error, Result};

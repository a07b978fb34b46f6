//! Core types and trait definitions for the Docket evidence store.
//!
//! This crate is deliberately free of database and PDF dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod document;
pub mod draft;
pub mod error;
pub mod evidence;
pub mod project;
pub mod report;
pub mod store;

pub use error::{Error, Result};

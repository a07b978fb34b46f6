//! SQLite backend for the Docket case store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! pool without blocking the async runtime. Every write that consumes a
//! sequence number runs inside a single SQL transaction, so numbers are
//! allocated atomically with the rows that use them.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;

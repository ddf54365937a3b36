//! SQLite backend for the Factbook archive.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Each year is written in a single
//! transaction; derived tables are rebuilt wholesale.

mod encode;
mod schema;
mod store;
mod validate;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;

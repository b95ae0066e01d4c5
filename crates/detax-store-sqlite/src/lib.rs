//! SQLite backend for the detax knowledge base.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. One [`SqliteStore`] implements both
//! [`detax_core::store::AggregateStore`] and
//! [`detax_core::store::EventLog`]; the two are still written in separate
//! transactions.

mod encode;
mod events;
mod schema;
mod search;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;

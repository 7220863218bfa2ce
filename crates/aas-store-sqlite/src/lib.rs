//! SQLite backend for the AAS telemetry store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. The structure synchronizer, reading
//! writer and query service are plain synchronous functions over a
//! [`rusqlite::Connection`]; [`SqliteStore`] runs them inside
//! `Connection::call`.

mod encode;
mod query;
mod schema;
mod store;
mod sync;
mod write;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

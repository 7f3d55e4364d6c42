//! SQLite backend for fuelwatch: the local replica and the upsert engine.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime.

mod encode;
mod replica;
mod schema;
mod store;

pub mod error;
pub mod upsert;

pub use error::{Error, Result};
pub use replica::{Replica, SyncReport};
pub use store::{ApplyReport, SqliteStore};

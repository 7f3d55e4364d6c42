//! The remote authoritative copy, reached over libSQL's HTTP pipeline
//! protocol (Hrana over HTTP).
//!
//! Writes reuse the statement plans of [`fuelwatch_store_sqlite::upsert`], so
//! the remote receives exactly the SQL the local replica executed.

pub mod error;
mod hrana;
mod remote;

pub use error::{Error, Result};
pub use remote::{HttpRemote, RemoteConfig};

//! Shared record types for the fuelwatch pipeline.
//!
//! The API client, both storage backends and the plotter all speak in these
//! types. Nothing here touches the network or a database.

pub mod error;
pub mod observation;
pub mod record;
pub mod remote;
pub mod time;
pub mod value;

pub use error::{Error, Result};

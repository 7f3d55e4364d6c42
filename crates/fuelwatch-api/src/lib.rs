//! Client for the Queensland fuel price reporting API.
//!
//! Fetches brands, fuel types, site details and current prices for one
//! region and normalises them into [`fuelwatch_core::record`] rows: prices in
//! dollars per litre, timestamps at the fixed local offset, duplicates and
//! incomplete rows removed.

mod client;
pub mod error;
mod wire;

pub use client::{ApiConfig, FuelApiClient};
pub use error::{Error, Result};

//! The typed read model used by plotting.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// A price record joined with its site, brand and fuel type names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
  pub site_id:        i64,
  pub site_name:      Option<String>,
  pub brand_name:     Option<String>,
  pub fuel_name:      String,
  pub transaction_at: DateTime<FixedOffset>,
  pub price:          f64,
  pub address:        Option<String>,
  pub postcode:       Option<String>,
  pub latitude:       Option<f64>,
  pub longitude:      Option<f64>,
}

impl PriceObservation {
  /// Calendar day at the stored (local) offset.
  pub fn transaction_date(&self) -> NaiveDate { self.transaction_at.date_naive() }
}

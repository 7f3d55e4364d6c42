//! Stored records: one struct per table.
//!
//! Dimension records (brands, fuel types, sites) carry nullable attributes;
//! a `None` means "unknown in this fetch", never "erase what we had".

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

// ─── Dimensions ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
  pub brand_id: i64,
  pub name:     Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelType {
  pub fuel_id: i64,
  pub name:    Option<String>,
}

/// A retail site. Every attribute except the id may be missing upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
  pub site_id:   i64,
  pub brand_id:  Option<i64>,
  pub name:      Option<String>,
  pub address:   Option<String>,
  pub postcode:  Option<String>,
  pub latitude:  Option<f64>,
  pub longitude: Option<f64>,
}

impl Site {
  /// A site known only by its id.
  pub fn bare(site_id: i64) -> Self {
    Self {
      site_id,
      brand_id: None,
      name: None,
      address: None,
      postcode: None,
      latitude: None,
      longitude: None,
    }
  }
}

// ─── Facts ───────────────────────────────────────────────────────────────────

/// One price observation, keyed by `(site_id, fuel_id, transaction_date)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
  pub site_id:          i64,
  pub fuel_id:          i64,
  /// Always expressed at the fixed local offset; see [`crate::time`].
  pub transaction_date: DateTime<FixedOffset>,
  /// Dollars per litre.
  pub price:            f64,
}

impl PriceRecord {
  pub fn key(&self) -> (i64, i64, DateTime<FixedOffset>) {
    (self.site_id, self.fuel_id, self.transaction_date)
  }
}

// ─── Dataset ─────────────────────────────────────────────────────────────────

/// The four row sets moved as one unit: fetched from the API, upserted into
/// the local replica, pushed to and pulled from the remote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
  pub brands:     Vec<Brand>,
  pub fuel_types: Vec<FuelType>,
  pub sites:      Vec<Site>,
  pub prices:     Vec<PriceRecord>,
}

impl Dataset {
  pub fn counts(&self) -> DatasetCounts {
    DatasetCounts {
      brands:     self.brands.len(),
      fuel_types: self.fuel_types.len(),
      sites:      self.sites.len(),
      prices:     self.prices.len(),
    }
  }

  pub fn is_empty(&self) -> bool { self.counts().total() == 0 }
}

/// Row counts per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetCounts {
  pub brands:     usize,
  pub fuel_types: usize,
  pub sites:      usize,
  pub prices:     usize,
}

impl DatasetCounts {
  pub fn total(&self) -> usize {
    self.brands + self.fuel_types + self.sites + self.prices
  }
}

impl fmt::Display for DatasetCounts {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "brands={} fuels={} sites={} prices={}",
      self.brands, self.fuel_types, self.sites, self.prices
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn counts_display_matches_run_summary() {
    let dataset = Dataset {
      brands: vec![Brand { brand_id: 1, name: Some("Shell".into()) }],
      sites: vec![Site::bare(10), Site::bare(11)],
      ..Dataset::default()
    };
    assert_eq!(
      dataset.counts().to_string(),
      "brands=1 fuels=0 sites=2 prices=0"
    );
    assert!(!dataset.is_empty());
    assert!(Dataset::default().is_empty());
  }
}

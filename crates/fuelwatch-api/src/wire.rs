//! Response shapes of the upstream API and their conversion into records.
//!
//! Array elements are decoded one at a time, so an element that does not fit
//! its shape is dropped instead of failing the whole response.

use std::{collections::HashSet, fmt};

use chrono::{DateTime, NaiveDateTime, Utc};
use fuelwatch_core::{
  record::{Brand, FuelType, PriceRecord, Site},
  time::to_local,
};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value as Json;
use tracing::{debug, warn};

/// The API reports tenths of a cent per litre.
pub const PRICE_DIVISOR: f64 = 1000.0;

// ─── Envelopes ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct BrandsResponse {
  #[serde(rename = "Brands")]
  pub brands: Vec<Json>,
}

#[derive(Debug, Deserialize)]
pub struct FuelsResponse {
  #[serde(rename = "Fuels")]
  pub fuels: Vec<Json>,
}

#[derive(Debug, Deserialize)]
pub struct SitesResponse {
  #[serde(rename = "S")]
  pub sites: Vec<Json>,
}

#[derive(Debug, Deserialize)]
pub struct PricesResponse {
  #[serde(rename = "SitePrices")]
  pub prices: Vec<Json>,
}

// ─── Rows ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct WireBrand {
  #[serde(rename = "BrandId")]
  brand_id: Option<i64>,
  #[serde(rename = "Name")]
  name:     Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireFuel {
  #[serde(rename = "FuelId")]
  fuel_id: Option<i64>,
  #[serde(rename = "Name")]
  name:    Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireSite {
  #[serde(rename = "S")]
  site_id:   Option<i64>,
  #[serde(rename = "B")]
  brand_id:  Option<i64>,
  #[serde(rename = "N")]
  name:      Option<String>,
  #[serde(rename = "A")]
  address:   Option<String>,
  #[serde(rename = "P")]
  postcode:  Option<Postcode>,
  #[serde(rename = "Lat")]
  latitude:  Option<f64>,
  #[serde(rename = "Lng")]
  longitude: Option<f64>,
}

/// Postcodes arrive as strings or bare numbers depending on the site.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Postcode {
  Text(String),
  Number(i64),
}

impl Postcode {
  fn into_text(self) -> String {
    match self {
      Self::Text(s) => s,
      Self::Number(n) => n.to_string(),
    }
  }
}

#[derive(Debug, Deserialize)]
struct WirePrice {
  #[serde(rename = "SiteId")]
  site_id:          Option<i64>,
  #[serde(rename = "FuelId")]
  fuel_id:          Option<i64>,
  #[serde(rename = "TransactionDateUtc")]
  transaction_date: Option<String>,
  #[serde(rename = "Price")]
  price:            Option<f64>,
}

// ─── Conversion ──────────────────────────────────────────────────────────────

/// Decode every element as `W` and convert it, dropping elements that fail
/// either step.
fn convert_rows<W, T>(
  endpoint: &'static str,
  rows: Vec<Json>,
  convert: impl Fn(W) -> Option<T>,
) -> Vec<T>
where
  W: DeserializeOwned + fmt::Debug,
{
  let total = rows.len();
  let kept: Vec<T> = rows
    .into_iter()
    .filter_map(|row| {
      let wire: W = match serde_json::from_value(row) {
        Ok(wire) => wire,
        Err(error) => {
          debug!(endpoint, %error, "dropping undecodable row");
          return None;
        }
      };
      let summary = format!("{wire:?}");
      let record = convert(wire);
      if record.is_none() {
        debug!(endpoint, row = %summary, "dropping incomplete row");
      }
      record
    })
    .collect();

  let dropped = total - kept.len();
  if dropped > 0 {
    warn!(endpoint, dropped, total, "dropped rows with missing or invalid fields");
  }
  kept
}

/// Brands with both an id and a name, exact duplicates removed.
pub fn brands(response: BrandsResponse) -> Vec<Brand> {
  let rows = convert_rows("GetCountryBrands", response.brands, |w: WireBrand| {
    Some((w.brand_id?, w.name?))
  });
  dedup_pairs(rows)
    .into_iter()
    .map(|(brand_id, name)| Brand { brand_id, name: Some(name) })
    .collect()
}

/// Fuel types with both an id and a name, exact duplicates removed.
pub fn fuel_types(response: FuelsResponse) -> Vec<FuelType> {
  let rows = convert_rows("GetCountryFuelTypes", response.fuels, |w: WireFuel| {
    Some((w.fuel_id?, w.name?))
  });
  dedup_pairs(rows)
    .into_iter()
    .map(|(fuel_id, name)| FuelType { fuel_id, name: Some(name) })
    .collect()
}

fn dedup_pairs(rows: Vec<(i64, String)>) -> Vec<(i64, String)> {
  let mut seen = HashSet::new();
  rows
    .into_iter()
    .filter(|row| seen.insert(row.clone()))
    .collect()
}

/// Sites with an id; every other attribute passes through as-is.
pub fn sites(response: SitesResponse) -> Vec<Site> {
  convert_rows("GetFullSiteDetails", response.sites, |w: WireSite| {
    Some(Site {
      site_id:   w.site_id?,
      brand_id:  w.brand_id,
      name:      w.name,
      address:   w.address,
      postcode:  w.postcode.map(Postcode::into_text),
      latitude:  w.latitude,
      longitude: w.longitude,
    })
  })
}

/// Complete price rows, normalised to dollars and local time, with
/// duplicate keys collapsed to their last occurrence.
pub fn prices(response: PricesResponse) -> Vec<PriceRecord> {
  let rows = convert_rows("GetSitesPrices", response.prices, |w: WirePrice| {
    Some(PriceRecord {
      site_id:          w.site_id?,
      fuel_id:          w.fuel_id?,
      transaction_date: to_local(parse_utc(w.transaction_date.as_deref()?)?),
      price:            w.price? / PRICE_DIVISOR,
    })
  });

  let total = rows.len();
  let kept = dedup_keep_last(rows);
  if kept.len() < total {
    debug!(duplicates = total - kept.len(), "collapsed duplicate price keys");
  }
  kept
}

fn dedup_keep_last(rows: Vec<PriceRecord>) -> Vec<PriceRecord> {
  let mut seen = HashSet::new();
  let mut kept: Vec<_> = rows
    .into_iter()
    .rev()
    .filter(|row| seen.insert(row.key()))
    .collect();
  kept.reverse();
  kept
}

/// Parse an upstream timestamp. One without an offset is taken as UTC.
pub fn parse_utc(s: &str) -> Option<DateTime<Utc>> {
  let s = s.trim();
  if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
    return Some(ts.with_timezone(&Utc));
  }
  ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
  use fuelwatch_core::time::encode_local;
  use serde_json::json;

  use super::*;

  fn prices_from(rows: Json) -> Vec<PriceRecord> {
    prices(serde_json::from_value(json!({ "SitePrices": rows })).unwrap())
  }

  #[test]
  fn price_is_converted_to_dollars_and_local_time() {
    let rows = prices_from(json!([
      { "SiteId": 10, "FuelId": 2, "TransactionDateUtc": "2024-01-01T00:00:00Z", "Price": 1500 }
    ]));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].price, 1.5);
    assert_eq!(encode_local(rows[0].transaction_date), "2024-01-01T10:00:00+10:00");
  }

  #[test]
  fn naive_timestamps_are_utc() {
    let rows = prices_from(json!([
      { "SiteId": 10, "FuelId": 2, "TransactionDateUtc": "2024-06-30T20:15:00", "Price": 1899 },
      { "SiteId": 11, "FuelId": 2, "TransactionDateUtc": "2024-06-30T20:15:00.123", "Price": 1899 }
    ]));
    assert_eq!(encode_local(rows[0].transaction_date), "2024-07-01T06:15:00+10:00");
    assert_eq!(encode_local(rows[1].transaction_date), "2024-07-01T06:15:00+10:00");
  }

  #[test]
  fn duplicate_keys_keep_the_last_occurrence() {
    let rows = prices_from(json!([
      { "SiteId": 10, "FuelId": 2, "TransactionDateUtc": "2024-01-01T00:00:00Z", "Price": 1500 },
      { "SiteId": 11, "FuelId": 2, "TransactionDateUtc": "2024-01-01T00:00:00Z", "Price": 1600 },
      { "SiteId": 10, "FuelId": 2, "TransactionDateUtc": "2024-01-01T00:00:00Z", "Price": 1550 }
    ]));
    let picked: Vec<_> = rows.iter().map(|r| (r.site_id, r.price)).collect();
    assert_eq!(picked, [(11, 1.6), (10, 1.55)]);
  }

  #[test]
  fn incomplete_or_malformed_prices_are_dropped() {
    let rows = prices_from(json!([
      { "SiteId": 10, "FuelId": 2, "TransactionDateUtc": "2024-01-01T00:00:00Z" },
      { "SiteId": 10, "TransactionDateUtc": "2024-01-01T00:00:00Z", "Price": 1500 },
      { "SiteId": 10, "FuelId": 2, "TransactionDateUtc": "not a date", "Price": 1500 },
      { "SiteId": "ten", "FuelId": 2, "TransactionDateUtc": "2024-01-01T00:00:00Z", "Price": 1500 },
      { "SiteId": 12, "FuelId": 2, "TransactionDateUtc": "2024-01-01T00:00:00Z", "Price": 1710 }
    ]));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].site_id, 12);
  }

  #[test]
  fn brands_drop_nameless_rows_and_exact_duplicates() {
    let rows = brands(
      serde_json::from_value(json!({ "Brands": [
        { "BrandId": 1, "Name": "Shell" },
        { "BrandId": 2 },
        { "BrandId": 1, "Name": "Shell" },
        { "BrandId": 3, "Name": "Puma" }
      ]}))
      .unwrap(),
    );
    let ids: Vec<_> = rows.iter().map(|b| b.brand_id).collect();
    assert_eq!(ids, [1, 3]);
  }

  #[test]
  fn sites_keep_partial_attributes() {
    let rows = sites(
      serde_json::from_value(json!({ "S": [
        { "S": 10, "B": 1, "N": "Cairns North", "A": "1 Sheridan St", "P": 4870, "Lat": -16.9, "Lng": 145.7 },
        { "S": 11, "P": "4868" },
        { "N": "No id" }
      ]}))
      .unwrap(),
    );
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].postcode.as_deref(), Some("4870"));
    assert_eq!(rows[1].brand_id, None);
    assert_eq!(rows[1].postcode.as_deref(), Some("4868"));
  }
}

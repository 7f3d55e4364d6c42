//! Conversions between [`Value`] and rusqlite's value types, plus the raw
//! row shape of the joined observation query.

use fuelwatch_core::{observation::PriceObservation, time::decode_local, value::Value};
use rusqlite::types::{Value as SqlValue, ValueRef};

use crate::Result;

pub fn encode_value(value: &Value) -> SqlValue {
  match value {
    Value::Null => SqlValue::Null,
    Value::Integer(i) => SqlValue::Integer(*i),
    Value::Real(r) => SqlValue::Real(*r),
    Value::Text(s) => SqlValue::Text(s.clone()),
  }
}

pub fn decode_value(value: ValueRef<'_>) -> Value {
  match value {
    ValueRef::Null => Value::Null,
    ValueRef::Integer(i) => Value::Integer(i),
    ValueRef::Real(r) => Value::Real(r),
    ValueRef::Text(t) | ValueRef::Blob(t) => {
      Value::Text(String::from_utf8_lossy(t).into_owned())
    }
  }
}

/// Read the first `width` columns of `row` as [`Value`]s.
pub fn decode_row(row: &rusqlite::Row<'_>, width: usize) -> rusqlite::Result<Vec<Value>> {
  (0..width).map(|i| row.get_ref(i).map(decode_value)).collect()
}

// ─── Observation rows ────────────────────────────────────────────────────────

/// Columns selected by the observation queries, in order.
pub const OBSERVATION_COLUMNS: &str = "
  P.Site_ID, S.Name, B.Name, COALESCE(F.Name, 'Fuel ' || F.Fuel_ID),
  P.TransactionDate, P.Price, S.Address, S.Postcode, S.Latitude, S.Longitude";

/// An observation straight off the connection, timestamp still text.
pub struct RawObservation {
  pub site_id:          i64,
  pub site_name:        Option<String>,
  pub brand_name:       Option<String>,
  pub fuel_name:        String,
  pub transaction_date: String,
  pub price:            f64,
  pub address:          Option<String>,
  pub postcode:         Option<String>,
  pub latitude:         Option<f64>,
  pub longitude:        Option<f64>,
}

impl RawObservation {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      site_id:          row.get(0)?,
      site_name:        row.get(1)?,
      brand_name:       row.get(2)?,
      fuel_name:        row.get(3)?,
      transaction_date: row.get(4)?,
      price:            row.get(5)?,
      address:          row.get(6)?,
      postcode:         row.get(7)?,
      latitude:         row.get(8)?,
      longitude:        row.get(9)?,
    })
  }

  pub fn into_observation(self) -> Result<PriceObservation> {
    Ok(PriceObservation {
      site_id:        self.site_id,
      site_name:      self.site_name,
      brand_name:     self.brand_name,
      fuel_name:      self.fuel_name,
      transaction_at: decode_local(&self.transaction_date)?,
      price:          self.price,
      address:        self.address,
      postcode:       self.postcode,
      latitude:       self.latitude,
      longitude:      self.longitude,
    })
  }
}

//! The upsert engine.
//!
//! Rows for one table are split into fixed-size chunks and each chunk becomes
//! a single multi-row `INSERT … ON CONFLICT … DO UPDATE` statement. Planning
//! is backend-neutral: a [`Statement`] is SQL text plus [`Value`] parameters,
//! executed unchanged on the local replica or shipped to the remote.
//!
//! Upserts are keyed on natural keys, so applying the same plan twice, or its
//! chunks in any order, leaves the same final state.

use fuelwatch_core::{
  Error as CoreError,
  record::{Brand, Dataset, FuelType, PriceRecord, Site},
  time::{decode_local, encode_local},
  value::Value,
};

// ─── Merge policy ────────────────────────────────────────────────────────────

/// What happens to the non-key columns of an existing row on key conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
  /// `col = COALESCE(excluded.col, Table.col)`: a null never erases a value.
  CoalescePreserve,
  /// `col = excluded.col`: last write wins.
  Replace,
}

// ─── Table mapping ───────────────────────────────────────────────────────────

/// Maps a record type onto its table.
pub trait Table: Sized {
  const NAME:    &'static str;
  /// All columns, in the order produced by [`Table::values`].
  const COLUMNS: &'static [&'static str];
  /// The uniqueness constraint targeted by `ON CONFLICT`.
  const KEY:     &'static [&'static str];
  const POLICY:  MergePolicy;
  /// Rows per statement.
  const CHUNK:   usize;

  fn values(&self) -> Vec<Value>;

  fn from_values(row: &[Value]) -> fuelwatch_core::Result<Self>;
}

fn check_width<T: Table>(row: &[Value]) -> fuelwatch_core::Result<()> {
  if row.len() == T::COLUMNS.len() {
    Ok(())
  } else {
    Err(CoreError::RowWidth {
      expected: T::COLUMNS.len(),
      found:    row.len(),
    })
  }
}

impl Table for Brand {
  const NAME: &'static str = "Brands";
  const COLUMNS: &'static [&'static str] = &["Brand_ID", "Name"];
  const KEY: &'static [&'static str] = &["Brand_ID"];
  const POLICY: MergePolicy = MergePolicy::CoalescePreserve;
  const CHUNK: usize = 1000;

  fn values(&self) -> Vec<Value> {
    vec![self.brand_id.into(), self.name.clone().into()]
  }

  fn from_values(row: &[Value]) -> fuelwatch_core::Result<Self> {
    check_width::<Self>(row)?;
    Ok(Self {
      brand_id: row[0].as_i64("Brand_ID")?,
      name:     row[1].as_opt_text("Name")?.map(str::to_owned),
    })
  }
}

impl Table for FuelType {
  const NAME: &'static str = "Fuel_Types";
  const COLUMNS: &'static [&'static str] = &["Fuel_ID", "Name"];
  const KEY: &'static [&'static str] = &["Fuel_ID"];
  const POLICY: MergePolicy = MergePolicy::CoalescePreserve;
  const CHUNK: usize = 1000;

  fn values(&self) -> Vec<Value> {
    vec![self.fuel_id.into(), self.name.clone().into()]
  }

  fn from_values(row: &[Value]) -> fuelwatch_core::Result<Self> {
    check_width::<Self>(row)?;
    Ok(Self {
      fuel_id: row[0].as_i64("Fuel_ID")?,
      name:    row[1].as_opt_text("Name")?.map(str::to_owned),
    })
  }
}

impl Table for Site {
  const NAME: &'static str = "Sites";
  const COLUMNS: &'static [&'static str] = &[
    "Site_ID", "Brand_ID", "Name", "Address", "Postcode", "Latitude", "Longitude",
  ];
  const KEY: &'static [&'static str] = &["Site_ID"];
  const POLICY: MergePolicy = MergePolicy::CoalescePreserve;
  const CHUNK: usize = 1000;

  fn values(&self) -> Vec<Value> {
    vec![
      self.site_id.into(),
      self.brand_id.into(),
      self.name.clone().into(),
      self.address.clone().into(),
      self.postcode.clone().into(),
      self.latitude.into(),
      self.longitude.into(),
    ]
  }

  fn from_values(row: &[Value]) -> fuelwatch_core::Result<Self> {
    check_width::<Self>(row)?;
    Ok(Self {
      site_id:   row[0].as_i64("Site_ID")?,
      brand_id:  row[1].as_opt_i64("Brand_ID")?,
      name:      row[2].as_opt_text("Name")?.map(str::to_owned),
      address:   row[3].as_opt_text("Address")?.map(str::to_owned),
      postcode:  postcode(&row[4])?,
      latitude:  row[5].as_opt_f64("Latitude")?,
      longitude: row[6].as_opt_f64("Longitude")?,
    })
  }
}

/// Postcodes are TEXT, but rows written by other tools may hold integers.
fn postcode(value: &Value) -> fuelwatch_core::Result<Option<String>> {
  match value {
    Value::Integer(i) => Ok(Some(i.to_string())),
    other => Ok(other.as_opt_text("Postcode")?.map(str::to_owned)),
  }
}

impl Table for PriceRecord {
  const NAME: &'static str = "Price_Records";
  const COLUMNS: &'static [&'static str] =
    &["Site_ID", "Fuel_ID", "TransactionDate", "Price"];
  const KEY: &'static [&'static str] = &["Site_ID", "Fuel_ID", "TransactionDate"];
  const POLICY: MergePolicy = MergePolicy::Replace;
  const CHUNK: usize = 2000;

  fn values(&self) -> Vec<Value> {
    vec![
      self.site_id.into(),
      self.fuel_id.into(),
      encode_local(self.transaction_date).into(),
      self.price.into(),
    ]
  }

  fn from_values(row: &[Value]) -> fuelwatch_core::Result<Self> {
    check_width::<Self>(row)?;
    Ok(Self {
      site_id:          row[0].as_i64("Site_ID")?,
      fuel_id:          row[1].as_i64("Fuel_ID")?,
      transaction_date: decode_local(row[2].as_text("TransactionDate")?)?,
      price:            row[3].as_f64("Price")?,
    })
  }
}

// ─── Statements ──────────────────────────────────────────────────────────────

/// One planned multi-row upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
  pub table:  &'static str,
  pub sql:    String,
  pub params: Vec<Value>,
  /// Number of rows carried by `params`.
  pub rows:   usize,
}

/// Build the upsert SQL for `rows` rows of `T`.
pub fn upsert_sql<T: Table>(rows: usize) -> String {
  let tuple = format!("({})", vec!["?"; T::COLUMNS.len()].join(", "));
  let values = vec![tuple.as_str(); rows].join(", ");

  let updates = T::COLUMNS
    .iter()
    .filter(|c| !T::KEY.contains(*c))
    .map(|c| match T::POLICY {
      MergePolicy::CoalescePreserve => {
        format!("{c} = COALESCE(excluded.{c}, {}.{c})", T::NAME)
      }
      MergePolicy::Replace => format!("{c} = excluded.{c}"),
    })
    .collect::<Vec<_>>()
    .join(", ");

  format!(
    "INSERT INTO {} ({}) VALUES {} ON CONFLICT({}) DO UPDATE SET {}",
    T::NAME,
    T::COLUMNS.join(", "),
    values,
    T::KEY.join(", "),
    updates,
  )
}

/// Plan the chunked upserts for one table. Empty input plans nothing.
pub fn plan<T: Table>(rows: &[T]) -> Vec<Statement> {
  rows
    .chunks(T::CHUNK)
    .map(|chunk| Statement {
      table:  T::NAME,
      sql:    upsert_sql::<T>(chunk.len()),
      params: chunk.iter().flat_map(|row| row.values()).collect(),
      rows:   chunk.len(),
    })
    .collect()
}

/// Plan a whole dataset in dependency order: brands, fuel types, sites, then
/// prices, so every foreign key resolves against rows written earlier.
pub fn plan_dataset(dataset: &Dataset) -> Vec<Statement> {
  let mut statements = plan(&dataset.brands);
  statements.extend(plan(&dataset.fuel_types));
  statements.extend(plan(&dataset.sites));
  statements.extend(plan(&dataset.prices));
  statements
}

/// `SELECT` every column of `T`, in key order.
pub fn select_all_sql<T: Table>() -> String {
  format!(
    "SELECT {} FROM {} ORDER BY {}",
    T::COLUMNS.join(", "),
    T::NAME,
    T::KEY.join(", ")
  )
}

//! [`SqliteStore`]: the SQLite local replica.

use std::path::Path;

use chrono::{Days, NaiveDate};
use fuelwatch_core::{
  observation::PriceObservation,
  record::{Brand, Dataset, DatasetCounts, FuelType, PriceRecord, Site},
  remote::RemoteStore,
  time::{decode_local, local_offset},
  value::Value,
};
use rusqlite::OptionalExtension as _;
use tracing::debug;

use crate::{
  Result,
  encode::{OBSERVATION_COLUMNS, RawObservation, decode_row, encode_value},
  schema::SCHEMA,
  upsert::{Statement, Table, plan_dataset, select_all_sql},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A fuel price database backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Outcome of [`SqliteStore::apply`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
  /// Rows submitted per table (inserted or merged).
  pub counts:     DatasetCounts,
  pub statements: usize,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mainly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// Upsert every table of `dataset` in dependency order inside a single
  /// transaction, then commit.
  ///
  /// A constraint violation in any statement (e.g. a price for an unknown
  /// site) rolls the whole transaction back and is returned as an error. An
  /// empty dataset touches nothing.
  pub async fn apply(&self, dataset: &Dataset) -> Result<ApplyReport> {
    let counts = dataset.counts();
    let plan = plan_dataset(dataset);
    let statements = plan.len();

    if plan.is_empty() {
      return Ok(ApplyReport { counts, statements });
    }

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for statement in &plan {
          execute(&tx, statement)?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(ApplyReport { counts, statements })
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// Every row of every table, each table in key order.
  pub async fn dataset(&self) -> Result<Dataset> {
    let (brands, fuel_types, sites, prices) = self
      .conn
      .call(|conn| {
        Ok((
          select_raw::<Brand>(conn)?,
          select_raw::<FuelType>(conn)?,
          select_raw::<Site>(conn)?,
          select_raw::<PriceRecord>(conn)?,
        ))
      })
      .await?;

    Ok(Dataset {
      brands:     decode_rows(&brands)?,
      fuel_types: decode_rows(&fuel_types)?,
      sites:      decode_rows(&sites)?,
      prices:     decode_rows(&prices)?,
    })
  }

  /// All price records joined with site, brand and fuel names, in
  /// chronological order. Sites without a brand are included.
  pub async fn observations(&self) -> Result<Vec<PriceObservation>> {
    let sql = format!(
      "SELECT {OBSERVATION_COLUMNS}
       FROM Price_Records AS P
       JOIN Sites AS S ON P.Site_ID = S.Site_ID
       JOIN Fuel_Types AS F ON P.Fuel_ID = F.Fuel_ID
       LEFT JOIN Brands AS B ON S.Brand_ID = B.Brand_ID
       ORDER BY P.TransactionDate, P.Site_ID, P.Fuel_ID"
    );

    let raws: Vec<RawObservation> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawObservation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawObservation::into_observation).collect()
  }

  /// The most recent transaction timestamp among prices at or below
  /// `max_price`, or `None` when there are none.
  pub async fn latest_transaction_date(&self, max_price: f64) -> Result<Option<NaiveDate>> {
    let latest: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT MAX(TransactionDate) FROM Price_Records WHERE Price <= ?1",
              rusqlite::params![max_price],
              |row| row.get(0),
            )
            .optional()?
            .flatten(),
        )
      })
      .await?;

    latest
      .map(|s| decode_local(&s).map(|ts| ts.date_naive()))
      .transpose()
      .map_err(Into::into)
  }

  /// Observations needed to plot the trailing `plot_days` window.
  ///
  /// Instead of the full history, returns the last price at or below
  /// `max_price` per (site, fuel) recorded before the window opens, followed
  /// by every such price inside the window. Replaying this yields the same
  /// per-day active prices as replaying everything.
  pub async fn plot_history(
    &self,
    plot_days: u32,
    max_price: f64,
  ) -> Result<Vec<PriceObservation>> {
    let Some(end) = self.latest_transaction_date(max_price).await? else {
      return Ok(Vec::new());
    };
    let window_start = end
      .checked_sub_days(Days::new(u64::from(plot_days)))
      .unwrap_or(NaiveDate::MIN);
    let start = window_start_timestamp(window_start);
    debug!(%start, "plot window opens");

    let sql = format!(
      "WITH filtered AS (
         SELECT Site_ID, Fuel_ID, TransactionDate, Price
         FROM Price_Records WHERE Price <= ?1
       ),
       seed AS (
         SELECT Site_ID, Fuel_ID, TransactionDate, Price FROM (
           SELECT Site_ID, Fuel_ID, TransactionDate, Price,
                  ROW_NUMBER() OVER (
                    PARTITION BY Site_ID, Fuel_ID ORDER BY TransactionDate DESC
                  ) AS rn
           FROM filtered WHERE TransactionDate < ?2
         ) WHERE rn = 1
       ),
       P AS (
         SELECT * FROM seed
         UNION ALL
         SELECT * FROM filtered WHERE TransactionDate >= ?2
       )
       SELECT {OBSERVATION_COLUMNS}
       FROM P
       JOIN Sites AS S ON P.Site_ID = S.Site_ID
       JOIN Fuel_Types AS F ON P.Fuel_ID = F.Fuel_ID
       LEFT JOIN Brands AS B ON S.Brand_ID = B.Brand_ID
       ORDER BY P.TransactionDate, P.Site_ID, P.Fuel_ID"
    );

    let raws: Vec<RawObservation> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![max_price, start], RawObservation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawObservation::into_observation).collect()
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn execute(tx: &rusqlite::Transaction<'_>, statement: &Statement) -> rusqlite::Result<()> {
  let mut prepared = tx.prepare_cached(&statement.sql)?;
  let affected =
    prepared.execute(rusqlite::params_from_iter(statement.params.iter().map(encode_value)))?;
  debug!(
    table = statement.table,
    rows = statement.rows,
    affected,
    "upsert chunk applied"
  );
  Ok(())
}

fn select_raw<T: Table>(conn: &rusqlite::Connection) -> rusqlite::Result<Vec<Vec<Value>>> {
  let mut stmt = conn.prepare(&select_all_sql::<T>())?;
  let width = T::COLUMNS.len();
  let rows = stmt
    .query_map([], |row| decode_row(row, width))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn decode_rows<T: Table>(rows: &[Vec<Value>]) -> Result<Vec<T>> {
  Ok(
    rows
      .iter()
      .map(|row| T::from_values(row))
      .collect::<fuelwatch_core::Result<Vec<_>>>()?,
  )
}

/// Local midnight of `date`, in the stored timestamp form.
fn window_start_timestamp(date: NaiveDate) -> String {
  format!("{date}T00:00:00{}", local_offset())
}

// ─── RemoteStore impl ────────────────────────────────────────────────────────

/// A second SQLite file can stand in as the authoritative copy.
impl RemoteStore for SqliteStore {
  type Error = crate::Error;

  async fn push(&self, dataset: &Dataset) -> Result<usize> {
    Ok(self.apply(dataset).await?.statements)
  }

  async fn pull(&self) -> Result<Dataset> { self.dataset().await }
}

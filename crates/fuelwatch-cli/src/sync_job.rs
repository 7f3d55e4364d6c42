//! Fetch the current region snapshot and sync it through the replica.

use anyhow::Context as _;
use fuelwatch_api::FuelApiClient;
use fuelwatch_core::remote::RemoteStore;
use fuelwatch_store_sqlite::{Replica, SyncReport};
use tracing::info;

/// Fetch, upsert locally, push, pull. Any failure aborts the run; rerunning
/// is always safe.
pub async fn run<R: RemoteStore>(
  client: &FuelApiClient,
  replica: &Replica<R>,
) -> anyhow::Result<SyncReport> {
  let dataset = client
    .fetch_all()
    .await
    .context("failed to fetch from the fuel price API")?;

  let report = replica
    .sync(&dataset)
    .await
    .context("failed to sync fetched rows")?;

  info!("Upserted: {}", report.local.counts);
  Ok(report)
}

//! [`Replica`]: a local SQLite copy kept in step with a remote.
//!
//! Writes land locally first and are committed; the same rows are then pushed
//! to the remote, and finally the remote's full state is pulled back and
//! merged into the local copy.

use fuelwatch_core::{
  record::{Dataset, DatasetCounts},
  remote::RemoteStore,
};
use tracing::info;

use crate::{ApplyReport, Error, Result, SqliteStore};

/// Summary of one [`Replica::sync`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
  /// What was committed locally from the caller's dataset.
  pub local:  ApplyReport,
  /// Statements executed on the remote.
  pub pushed: usize,
  /// Rows read back from the remote.
  pub pulled: DatasetCounts,
}

pub struct Replica<R> {
  local:  SqliteStore,
  remote: R,
}

impl<R: RemoteStore> Replica<R> {
  pub fn new(local: SqliteStore, remote: R) -> Self { Self { local, remote } }

  pub fn local(&self) -> &SqliteStore { &self.local }

  pub fn remote(&self) -> &R { &self.remote }

  /// Commit `dataset` locally, push it to the remote, then pull.
  ///
  /// Stops at the first failure. Every step is an idempotent upsert, so a
  /// failed run can simply be repeated.
  pub async fn sync(&self, dataset: &Dataset) -> Result<SyncReport> {
    let local = self.local.apply(dataset).await?;
    info!(counts = %local.counts, statements = local.statements, "committed locally");

    let pushed = self
      .remote
      .push(dataset)
      .await
      .map_err(|e| Error::Remote(Box::new(e)))?;
    info!(statements = pushed, "pushed to remote");

    let pulled = self.pull().await?;

    Ok(SyncReport { local, pushed, pulled })
  }

  /// Merge the remote's current state into the local copy.
  pub async fn pull(&self) -> Result<DatasetCounts> {
    let remote = self
      .remote
      .pull()
      .await
      .map_err(|e| Error::Remote(Box::new(e)))?;
    let counts = remote.counts();

    self.local.apply(&remote).await?;
    info!(%counts, "pulled from remote");

    Ok(counts)
  }
}

//! The `RemoteStore` trait.
//!
//! A remote is the authoritative copy of the price database. The local
//! replica writes first, then pushes the same rows upstream and pulls the
//! remote's state back. Implemented by `fuelwatch-remote` (libSQL over HTTP)
//! and by `fuelwatch-store-sqlite` (a second SQLite file).

use std::future::Future;

use crate::record::Dataset;

pub trait RemoteStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Upsert `dataset` on the remote with the same merge policies the local
  /// replica uses. Returns the number of statements executed.
  fn push(&self, dataset: &Dataset) -> impl Future<Output = Result<usize, Self::Error>> + Send;

  /// Read every row of every table from the remote.
  fn pull(&self) -> impl Future<Output = Result<Dataset, Self::Error>> + Send;
}

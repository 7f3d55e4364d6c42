//! Shared plumbing for the `fuel-sync` and `fuel-plot` binaries:
//! configuration, secrets, and the two jobs they run.

pub mod error;
pub mod plot_job;
pub mod secret;
pub mod settings;
pub mod sync_job;

use anyhow::Context as _;
use fuelwatch_remote::{HttpRemote, RemoteConfig};
use fuelwatch_store_sqlite::{Replica, SqliteStore};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

pub use error::{Error, Result};

use crate::{secret::Secret, settings::StoreSettings};

/// Install the `fmt` subscriber, `INFO` unless `RUST_LOG` says otherwise.
pub fn init_tracing() {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();
}

/// Open the local replica file and pair it with the remote database.
pub async fn open_replica(
  store: &StoreSettings,
  token: Secret,
) -> anyhow::Result<Replica<HttpRemote>> {
  let local = SqliteStore::open(&store.replica_path)
    .await
    .with_context(|| format!("failed to open replica at {:?}", store.replica_path))?;
  let remote = HttpRemote::new(RemoteConfig {
    url:   store.remote_url.clone(),
    token: token.into_inner(),
  })
  .context("failed to build remote client")?;
  info!(
    replica = %store.replica_path.display(),
    endpoint = remote.endpoint(),
    "opened replica"
  );
  Ok(Replica::new(local, remote))
}

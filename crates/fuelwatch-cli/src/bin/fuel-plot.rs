//! `fuel-plot`: render the price distribution and trend charts from the
//! local replica, after pulling the remote's latest rows.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use fuelwatch_cli::{open_replica, plot_job, secret::TURSO_AUTH_TOKEN, settings::Settings};
use fuelwatch_store_sqlite::SqliteStore;

#[derive(Parser)]
#[command(author, version, about = "Render fuel price charts")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "fuelwatch.toml")]
  config: PathBuf,

  /// Plot from the local replica as it is, without pulling from the remote.
  #[arg(long)]
  offline: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
  fuelwatch_cli::init_tracing();
  let cli = Cli::parse();

  let settings = Settings::load(&cli.config).context("failed to load configuration")?;

  let store = if cli.offline {
    SqliteStore::open(&settings.store.replica_path)
      .await
      .with_context(|| format!("failed to open replica at {:?}", settings.store.replica_path))?
  } else {
    let replica = open_replica(&settings.store, TURSO_AUTH_TOKEN.load()?).await?;
    replica.pull().await.context("failed to pull from remote")?;
    replica.local().clone()
  };

  plot_job::run(&store, &settings.plot).await?;
  Ok(())
}

//! `fuel-sync`: fetch the current fuel prices for the configured region and
//! sync them into the local replica and the remote database.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use fuelwatch_api::FuelApiClient;
use fuelwatch_cli::{
  open_replica,
  secret::{FUEL_API_TOKEN, TURSO_AUTH_TOKEN},
  settings::Settings,
  sync_job,
};

#[derive(Parser)]
#[command(author, version, about = "Fetch fuel prices and sync them to the database")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "fuelwatch.toml")]
  config: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
  fuelwatch_cli::init_tracing();
  let cli = Cli::parse();

  let settings = Settings::load(&cli.config).context("failed to load configuration")?;

  // Both secrets are resolved before any network activity.
  let api_token = FUEL_API_TOKEN.load()?;
  let remote_token = TURSO_AUTH_TOKEN.load()?;

  let client = FuelApiClient::new(settings.api.clone(), api_token.expose())
    .context("failed to build API client")?;
  let replica = open_replica(&settings.store, remote_token).await?;

  sync_job::run(&client, &replica).await?;
  Ok(())
}

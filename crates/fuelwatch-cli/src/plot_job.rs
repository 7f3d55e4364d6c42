//! Read the replica back and render the charts.

use std::path::PathBuf;

use anyhow::Context as _;
use fuelwatch_plot::{assemble, render_distribution, render_trend, write_svg};
use fuelwatch_store_sqlite::SqliteStore;
use tracing::info;

use crate::settings::PlotSettings;

pub const DISTRIBUTION_FILE: &str = "fuel_price_distribution.svg";
pub const TREND_FILE: &str = "fuel_price_trend.svg";

/// Files written by one run; `None` where there was nothing to draw.
#[derive(Debug, Default)]
pub struct PlotOutputs {
  pub distribution: Option<PathBuf>,
  pub trend:        Option<PathBuf>,
}

pub async fn run(store: &SqliteStore, settings: &PlotSettings) -> anyhow::Result<PlotOutputs> {
  let options = settings.options();
  let history = store
    .plot_history(options.plot_days, options.max_price)
    .await
    .context("failed to read price history")?;
  info!(observations = history.len(), "loaded price history");

  let data = assemble(&history, &options);
  if data.is_empty() {
    info!("no prices to plot");
    return Ok(PlotOutputs::default());
  }

  let mut outputs = PlotOutputs::default();

  let distribution = data.trailing(settings.plot_days);
  if let Some(svg) = render_distribution(&distribution, settings.style())? {
    let path = settings.output_dir.join(DISTRIBUTION_FILE);
    write_svg(&path, &svg)?;
    outputs.distribution = Some(path);
  }

  let minimums = data.trailing(settings.trend_days).daily_minimums();
  if let Some(svg) = render_trend(&minimums)? {
    let path = settings.output_dir.join(TREND_FILE);
    write_svg(&path, &svg)?;
    outputs.trend = Some(path);
  }

  Ok(outputs)
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone as _};
  use fuelwatch_core::{
    record::{Brand, Dataset, FuelType, PriceRecord, Site},
    time::local_offset,
  };
  use fuelwatch_plot::PlotOptions;

  use super::*;

  async fn seeded_store() -> SqliteStore {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let at = |day| local_offset().with_ymd_and_hms(2024, 2, day, 8, 30, 0).unwrap();
    store
      .apply(&Dataset {
        brands:     vec![Brand { brand_id: 1, name: Some("Shell".into()) }],
        fuel_types: vec![
          FuelType { fuel_id: 2, name: Some("Unleaded".into()) },
          FuelType { fuel_id: 3, name: Some("LPG".into()) },
        ],
        sites:      vec![Site::bare(10), Site::bare(11)],
        prices:     vec![
          PriceRecord { site_id: 10, fuel_id: 2, transaction_date: at(1), price: 1.85 },
          PriceRecord { site_id: 11, fuel_id: 2, transaction_date: at(2), price: 1.91 },
          PriceRecord { site_id: 10, fuel_id: 2, transaction_date: at(5), price: 1.79 },
          PriceRecord { site_id: 11, fuel_id: 3, transaction_date: at(5), price: 0.99 },
        ],
      })
      .await
      .unwrap();
    store
  }

  #[tokio::test]
  async fn test_writes_both_charts() {
    let dir = tempfile::tempdir().unwrap();
    let settings = PlotSettings {
      output_dir: dir.path().join("plots"),
      violin: true,
      ..PlotSettings::default()
    };

    let outputs = run(&seeded_store().await, &settings).await.unwrap();

    let distribution = outputs.distribution.unwrap();
    assert_eq!(distribution, dir.path().join("plots").join(DISTRIBUTION_FILE));
    let svg = std::fs::read_to_string(distribution).unwrap();
    assert!(svg.contains("Unleaded"));
    assert!(!svg.contains("LPG"));
    assert!(outputs.trend.unwrap().exists());
  }

  #[tokio::test]
  async fn test_empty_store_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let settings = PlotSettings { output_dir: dir.path().to_path_buf(), ..PlotSettings::default() };
    let store = SqliteStore::open_in_memory().await.unwrap();

    let outputs = run(&store, &settings).await.unwrap();

    assert!(outputs.distribution.is_none() && outputs.trend.is_none());
    assert!(!dir.path().join(DISTRIBUTION_FILE).exists());
  }

  /// 400 prices over 5 sites and 3 fuel ids spread across 90 days. Fuel ids
  /// 2 and 4 share the name "Unleaded"; every 37th price is above the
  /// default ceiling.
  async fn scattered_store() -> SqliteStore {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move |bound: u64| {
      state = state
        .wrapping_mul(6_364_136_223_846_793_005)
        .wrapping_add(1_442_695_040_888_963_407);
      (state >> 33) % bound
    };

    let origin = local_offset().with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let fuel_ids = [2, 3, 4];
    let prices = (0..400)
      .map(|i| PriceRecord {
        site_id:          10 + next(5) as i64,
        fuel_id:          fuel_ids[next(3) as usize],
        transaction_date: origin + Duration::minutes(next(90 * 24 * 60) as i64),
        price:            if i % 37 == 0 { 6.0 } else { 1.5 + next(100) as f64 / 100.0 },
      })
      .collect();

    let store = SqliteStore::open_in_memory().await.unwrap();
    store
      .apply(&Dataset {
        brands: vec![],
        fuel_types: vec![
          FuelType { fuel_id: 2, name: Some("Unleaded".into()) },
          FuelType { fuel_id: 3, name: Some("Diesel".into()) },
          FuelType { fuel_id: 4, name: Some("Unleaded".into()) },
        ],
        sites: (10..15).map(Site::bare).collect(),
        prices,
      })
      .await
      .unwrap();
    store
  }

  #[tokio::test]
  async fn test_windowed_history_assembles_like_full_history() {
    let store = scattered_store().await;
    let full = store.observations().await.unwrap();
    assert!(full.iter().any(|o| o.price > PlotOptions::default().max_price));

    for plot_days in [0, 1, 5, 30, 60, 500] {
      let options = PlotOptions { plot_days, ..PlotOptions::default() };
      let windowed = store.plot_history(plot_days, options.max_price).await.unwrap();

      let expected = assemble(&full, &options);
      assert!(!expected.is_empty());
      assert_eq!(assemble(&windowed, &options), expected, "plot_days = {plot_days}");
    }
  }
}

//! Run configuration.
//!
//! Every field has a default, so the file is optional. Environment variables
//! prefixed with `FUELWATCH_` override it, with `__` between nested keys:
//! `FUELWATCH_PLOT__PLOT_DAYS=30`. Secrets never live here; see
//! [`crate::secret`].

use std::path::{Path, PathBuf};

use fuelwatch_api::ApiConfig;
use fuelwatch_plot::{ChartStyle, PlotOptions, assemble::DEFAULT_EXCLUDED_FUELS};
use serde::Deserialize;

use crate::Result;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub api:   ApiConfig,
  pub store: StoreSettings,
  pub plot:  PlotSettings,
}

impl Settings {
  /// Layer the file at `path` (if present) and the environment over the
  /// defaults.
  pub fn load(path: &Path) -> Result<Self> { Self::load_with(path, environment()) }

  fn load_with(path: &Path, environment: config::Environment) -> Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(environment)
      .build()?;
    Ok(settings.try_deserialize()?)
  }
}

/// `FUELWATCH_<SECTION>__<KEY>` variables.
fn environment() -> config::Environment {
  config::Environment::with_prefix("FUELWATCH")
    .prefix_separator("_")
    .separator("__")
    .try_parsing(true)
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
  /// Local SQLite replica.
  pub replica_path: PathBuf,
  /// Remote database, `libsql://` or `https://`.
  pub remote_url:   String,
}

impl Default for StoreSettings {
  fn default() -> Self {
    Self {
      replica_path: PathBuf::from("turso_cache.db"),
      remote_url:   "libsql://cairns-fuel-h-unter.aws-ap-northeast-1.turso.io".into(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlotSettings {
  pub plot_days:      u32,
  /// Window of the daily-minimum trend chart.
  pub trend_days:     u32,
  pub max_price:      f64,
  pub excluded_fuels: Vec<String>,
  pub output_dir:     PathBuf,
  pub boxplot:        bool,
  pub violin:         bool,
}

impl Default for PlotSettings {
  fn default() -> Self {
    Self {
      plot_days:      60,
      trend_days:     30,
      max_price:      5.0,
      excluded_fuels: DEFAULT_EXCLUDED_FUELS.map(String::from).to_vec(),
      output_dir:     PathBuf::from("plots"),
      boxplot:        true,
      violin:         false,
    }
  }
}

impl PlotSettings {
  /// Assembly options covering both charts' windows.
  pub fn options(&self) -> PlotOptions {
    PlotOptions {
      plot_days:      self.plot_days.max(self.trend_days),
      max_price:      self.max_price,
      excluded_fuels: self.excluded_fuels.clone(),
    }
  }

  pub fn style(&self) -> ChartStyle {
    ChartStyle { boxplot: self.boxplot, violin: self.violin }
  }
}

#[cfg(test)]
mod tests {
  use std::{collections::HashMap, io::Write as _};

  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load(&dir.path().join("absent.toml")).unwrap();

    assert_eq!(settings.api.country_id, 21);
    assert_eq!(settings.api.region_id, 16);
    assert_eq!(settings.store.replica_path, PathBuf::from("turso_cache.db"));
    assert_eq!(settings.plot.plot_days, 60);
    assert_eq!(settings.plot.max_price, 5.0);
    assert!(settings.plot.excluded_fuels.contains(&"LPG".to_owned()));
    assert_eq!(settings.plot.style(), ChartStyle::default());
  }

  #[test]
  fn file_overrides_some_fields() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
      file,
      r#"
[api]
region_id = 7

[store]
remote_url = "http://127.0.0.1:8080"

[plot]
plot_days = 14
violin = true
excluded_fuels = []
"#
    )
    .unwrap();

    let settings = Settings::load(file.path()).unwrap();

    assert_eq!(settings.api.region_id, 7);
    assert_eq!(settings.api.country_id, 21);
    assert_eq!(settings.store.remote_url, "http://127.0.0.1:8080");
    assert_eq!(settings.plot.plot_days, 14);
    assert!(settings.plot.violin && settings.plot.boxplot);
    assert!(settings.plot.excluded_fuels.is_empty());
    assert_eq!(settings.plot.trend_days, 30);
  }

  #[test]
  fn environment_overrides_file_and_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[plot]\nplot_days = 14\nmax_price = 3.5").unwrap();

    let vars = HashMap::from([
      ("FUELWATCH_PLOT__PLOT_DAYS".to_owned(), "30".to_owned()),
      ("FUELWATCH_STORE__REPLICA_PATH".to_owned(), "/var/lib/fuel/replica.db".to_owned()),
      ("FUELWATCH_API__REGION_ID".to_owned(), "7".to_owned()),
    ]);
    let settings =
      Settings::load_with(file.path(), environment().source(Some(vars))).unwrap();

    assert_eq!(settings.plot.plot_days, 30);
    assert_eq!(settings.plot.max_price, 3.5);
    assert_eq!(settings.store.replica_path, PathBuf::from("/var/lib/fuel/replica.db"));
    assert_eq!(settings.api.region_id, 7);
    assert_eq!(settings.api.country_id, 21);
  }

  #[test]
  fn unrelated_variables_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let vars = HashMap::from([
      ("PLOT__PLOT_DAYS".to_owned(), "5".to_owned()),
      ("FUEL_API_TOKEN".to_owned(), "secret".to_owned()),
    ]);
    let settings =
      Settings::load_with(&dir.path().join("absent.toml"), environment().source(Some(vars)))
        .unwrap();

    assert_eq!(settings, Settings::default());
  }

  #[test]
  fn options_cover_the_wider_window() {
    let plot = PlotSettings { plot_days: 10, trend_days: 30, ..PlotSettings::default() };
    assert_eq!(plot.options().plot_days, 30);
  }
}

//! Plot data assembly.
//!
//! Observations are replayed day by day over the whole history they cover,
//! keeping the latest price per (fuel, site). Days inside the plot window
//! produce a snapshot of every site's active price for each fuel type. A
//! site's price stays active until that site reports a new one.

use std::collections::{BTreeMap, HashSet};

use chrono::{Days, NaiveDate};
use fuelwatch_core::observation::PriceObservation;
use tracing::debug;

pub const DEFAULT_EXCLUDED_FUELS: [&str; 4] =
  ["Premium Diesel", "Premium Unleaded 95", "Premium Unleaded 98", "LPG"];

/// Assembly parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOptions {
  /// Days before the latest observation to include; the window holds
  /// `plot_days + 1` calendar days.
  pub plot_days:      u32,
  /// Observations priced above this (dollars per litre) are ignored.
  pub max_price:      f64,
  pub excluded_fuels: Vec<String>,
}

impl Default for PlotOptions {
  fn default() -> Self {
    Self {
      plot_days:      60,
      max_price:      5.0,
      excluded_fuels: DEFAULT_EXCLUDED_FUELS.map(String::from).to_vec(),
    }
  }
}

/// Active prices for one fuel type on one day, ordered by site id.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySnapshot {
  pub date:   NaiveDate,
  pub prices: Vec<f64>,
}

/// Per fuel type, the snapshots of every day in the window on which at
/// least one site had an active price.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotData {
  pub fuels: BTreeMap<String, Vec<DaySnapshot>>,
}

impl PlotData {
  pub fn is_empty(&self) -> bool { self.fuels.is_empty() }

  pub fn get(&self, fuel: &str) -> Option<&[DaySnapshot]> {
    self.fuels.get(fuel).map(Vec::as_slice)
  }

  /// Earliest and latest snapshot dates across all fuel types.
  pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
    let dates = self.fuels.values().flatten().map(|s| s.date);
    let first = dates.clone().min()?;
    let last = dates.max()?;
    Some((first, last))
  }

  /// Only the trailing `days` days, counted back from the latest snapshot.
  /// Fuel types left with no snapshots are dropped.
  pub fn trailing(&self, days: u32) -> Self {
    let Some((_, last)) = self.date_range() else {
      return Self::default();
    };
    let start = last
      .checked_sub_days(Days::new(u64::from(days)))
      .unwrap_or(NaiveDate::MIN);

    let fuels = self
      .fuels
      .iter()
      .filter_map(|(fuel, snapshots)| {
        let kept: Vec<_> = snapshots
          .iter()
          .filter(|s| s.date >= start)
          .cloned()
          .collect();
        (!kept.is_empty()).then(|| (fuel.clone(), kept))
      })
      .collect();
    Self { fuels }
  }

  /// The cheapest active price per fuel type per day.
  pub fn daily_minimums(&self) -> BTreeMap<String, Vec<(NaiveDate, f64)>> {
    self
      .fuels
      .iter()
      .map(|(fuel, snapshots)| {
        let series = snapshots
          .iter()
          .map(|s| (s.date, s.prices.iter().copied().fold(f64::INFINITY, f64::min)))
          .collect();
        (fuel.clone(), series)
      })
      .collect()
  }
}

/// Replay `observations` and snapshot the trailing plot window.
///
/// The input need not be sorted. Observations above the price ceiling are
/// discarded before anything else, so they never become active and never
/// extend the date range.
pub fn assemble(observations: &[PriceObservation], options: &PlotOptions) -> PlotData {
  let mut rows: Vec<&PriceObservation> = observations
    .iter()
    .filter(|o| o.price <= options.max_price)
    .collect();
  rows.sort_by_key(|o| o.transaction_at);

  let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
    return PlotData::default();
  };
  let start = first.transaction_date();
  let end = last.transaction_date();
  let window_start = end
    .checked_sub_days(Days::new(u64::from(options.plot_days)))
    .unwrap_or(start);
  debug!(%start, %end, %window_start, rows = rows.len(), "replaying price history");

  let excluded: HashSet<&str> = options.excluded_fuels.iter().map(String::as_str).collect();
  let mut active: BTreeMap<&str, BTreeMap<i64, f64>> = BTreeMap::new();
  let mut fuels: BTreeMap<String, Vec<DaySnapshot>> = BTreeMap::new();
  let mut pending = rows.into_iter().peekable();
  let mut day = start;

  loop {
    while let Some(o) = pending.next_if(|o| o.transaction_date() <= day) {
      active
        .entry(o.fuel_name.as_str())
        .or_default()
        .insert(o.site_id, o.price);
    }

    if day >= window_start {
      for (fuel, sites) in &active {
        if sites.is_empty() || excluded.contains(fuel) {
          continue;
        }
        fuels.entry((*fuel).to_owned()).or_default().push(DaySnapshot {
          date:   day,
          prices: sites.values().copied().collect(),
        });
      }
    }

    match day.succ_opt() {
      Some(next) if day < end => day = next,
      _ => break,
    }
  }

  PlotData { fuels }
}

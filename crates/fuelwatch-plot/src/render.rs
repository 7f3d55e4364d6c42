//! SVG chart rendering.
//!
//! Both charts share one x axis convention: `f64` day offsets from the
//! earliest plotted date, labelled back as calendar dates. Glyphs sit on
//! whole-number offsets.

use std::{collections::BTreeMap, fs, iter, path::Path};

use chrono::{Days, NaiveDate};
use plotters::{
  coord::{cartesian::Cartesian2d, types::RangedCoordf64},
  prelude::*,
};
use tracing::info;

use crate::{
  Result,
  assemble::{DaySnapshot, PlotData},
  stats::{BoxStats, density},
};

const WIDTH: u32 = 900;
const PANEL_HEIGHT: u32 = 260;
const TREND_HEIGHT: u32 = 420;

const BOX_HALF_WIDTH: f64 = 0.2;
const CAP_HALF_WIDTH: f64 = 0.1;
const VIOLIN_HALF_WIDTH: f64 = 0.8;
const DENSITY_POINTS: usize = 40;
/// Mean diamond and outlier cross size, in pixels.
const MARKER_SIZE: i32 = 4;

/// Categorical palette, cycled by panel or series index.
const PALETTE: [RGBColor; 10] = [
  RGBColor(31, 119, 180),
  RGBColor(255, 127, 14),
  RGBColor(44, 160, 44),
  RGBColor(214, 39, 40),
  RGBColor(148, 103, 189),
  RGBColor(140, 86, 75),
  RGBColor(227, 119, 194),
  RGBColor(127, 127, 127),
  RGBColor(188, 189, 34),
  RGBColor(23, 190, 207),
];

fn colour(index: usize) -> RGBColor { PALETTE[index % PALETTE.len()] }

/// Which glyphs the distribution chart draws for each day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartStyle {
  pub boxplot: bool,
  pub violin:  bool,
}

impl Default for ChartStyle {
  fn default() -> Self { Self { boxplot: true, violin: false } }
}

// ─── Axes ────────────────────────────────────────────────────────────────────

fn offset(origin: NaiveDate, date: NaiveDate) -> f64 {
  (date - origin).num_days() as f64
}

/// `%b %d` label for a whole-day offset; blank between days.
fn day_label(origin: NaiveDate, x: f64) -> String {
  let rounded = x.round();
  if rounded < 0.0 || (x - rounded).abs() > 1e-6 {
    return String::new();
  }
  origin
    .checked_add_days(Days::new(rounded as u64))
    .map(|d| d.format("%b %d").to_string())
    .unwrap_or_default()
}

/// Price axis range with a little headroom; never degenerate.
/// Diamond vertices around the origin, in pixels. `closed` repeats the
/// first vertex so the outline can be stroked as a path.
fn diamond(closed: bool) -> Vec<(i32, i32)> {
  let r = MARKER_SIZE;
  let mut points = vec![(0, -r), (r, 0), (0, r), (-r, 0)];
  if closed {
    points.push((0, -r));
  }
  points
}

fn price_range(prices: impl Iterator<Item = f64>) -> (f64, f64) {
  let (lo, hi) = prices.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
    (lo.min(p), hi.max(p))
  });
  if !lo.is_finite() || !hi.is_finite() {
    return (0.0, 1.0);
  }
  let pad = ((hi - lo) * 0.05).max(0.05);
  (lo - pad, hi + pad)
}

// ─── Distribution chart ──────────────────────────────────────────────────────

/// One panel per fuel type, stacked, in name order.
///
/// Returns `None` for empty data.
pub fn render_distribution(data: &PlotData, style: ChartStyle) -> Result<Option<String>> {
  let Some((first, last)) = data.date_range() else {
    return Ok(None);
  };
  let span = offset(first, last);
  let panels = data.fuels.len() as u32;

  let mut svg = String::new();
  {
    let root =
      SVGBackend::with_string(&mut svg, (WIDTH, PANEL_HEIGHT * panels)).into_drawing_area();
    root.fill(&WHITE)?;
    let areas = root.split_evenly((data.fuels.len(), 1));

    for (i, ((fuel, snapshots), area)) in data.fuels.iter().zip(&areas).enumerate() {
      let colour = colour(i);
      let (y_min, y_max) =
        price_range(snapshots.iter().flat_map(|s| s.prices.iter().copied()));

      let mut chart = ChartBuilder::on(area)
        .caption(fuel, ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(60)
        .build_cartesian_2d(-1.0..span + 1.0, y_min..y_max)?;

      chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("Price ($/L)")
        .x_labels(12)
        .y_labels(6)
        .x_label_formatter(&|x| day_label(first, *x))
        .y_label_formatter(&|y| format!("{y:.2}"))
        .label_style(("sans-serif", 12))
        .draw()?;

      for snapshot in snapshots {
        let x = offset(first, snapshot.date);
        if style.violin {
          draw_violin(&mut chart, x, snapshot, colour)?;
        }
        if style.boxplot {
          draw_box(&mut chart, x, snapshot, colour)?;
        }
      }

      if style.boxplot {
        draw_box_legend(&mut chart, colour)?;
      }
    }

    root.present()?;
  }

  Ok(Some(svg))
}

type Chart<'a, 'b> =
  ChartContext<'a, SVGBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

fn draw_box(
  chart: &mut Chart<'_, '_>,
  x: f64,
  snapshot: &DaySnapshot,
  colour: RGBColor,
) -> Result<()> {
  let Some(stats) = BoxStats::new(&snapshot.prices) else {
    return Ok(());
  };
  let line = colour.stroke_width(1);
  let (l, r) = (x - BOX_HALF_WIDTH, x + BOX_HALF_WIDTH);

  chart.draw_series([
    Rectangle::new([(l, stats.q1), (r, stats.q3)], colour.mix(0.6).filled()),
    Rectangle::new([(l, stats.q1), (r, stats.q3)], colour.stroke_width(2)),
  ])?;
  chart.draw_series([
    PathElement::new(vec![(l, stats.median), (r, stats.median)], colour.stroke_width(2)),
    PathElement::new(vec![(x, stats.q1), (x, stats.whisker_low)], line),
    PathElement::new(vec![(x, stats.q3), (x, stats.whisker_high)], line),
    PathElement::new(
      vec![(x - CAP_HALF_WIDTH, stats.whisker_low), (x + CAP_HALF_WIDTH, stats.whisker_low)],
      line,
    ),
    PathElement::new(
      vec![(x - CAP_HALF_WIDTH, stats.whisker_high), (x + CAP_HALF_WIDTH, stats.whisker_high)],
      line,
    ),
  ])?;
  chart.draw_series([
    EmptyElement::at((x, stats.mean))
      + Polygon::new(diamond(false), WHITE.filled())
      + PathElement::new(diamond(true), colour.stroke_width(1)),
  ])?;
  chart.draw_series(
    stats
      .outliers
      .iter()
      .map(|&v| Cross::new((x, v), MARKER_SIZE, colour)),
  )?;
  Ok(())
}

/// Legend entries for the mean and outlier glyphs.
fn draw_box_legend<'a, 'b: 'a>(chart: &mut Chart<'a, 'b>, colour: RGBColor) -> Result<()> {
  chart
    .draw_series(iter::empty::<Cross<(f64, f64), i32>>())?
    .label("Mean")
    .legend(move |(x, y)| {
      EmptyElement::at((x, y))
        + Polygon::new(diamond(false), WHITE.filled())
        + PathElement::new(diamond(true), colour.stroke_width(1))
    });
  chart
    .draw_series(iter::empty::<Cross<(f64, f64), i32>>())?
    .label("Outlier")
    .legend(move |(x, y)| Cross::new((x, y), MARKER_SIZE, colour));

  chart
    .configure_series_labels()
    .position(SeriesLabelPosition::UpperRight)
    .background_style(WHITE.mix(0.8))
    .border_style(BLACK)
    .label_font(("sans-serif", 12))
    .draw()?;
  Ok(())
}

fn draw_violin(
  chart: &mut Chart<'_, '_>,
  x: f64,
  snapshot: &DaySnapshot,
  colour: RGBColor,
) -> Result<()> {
  let curve = density(&snapshot.prices, DENSITY_POINTS);
  let peak = curve.iter().map(|&(_, d)| d).fold(0.0, f64::max);

  if peak > 0.0 {
    let half = |d: f64| d / peak * VIOLIN_HALF_WIDTH;
    let outline: Vec<(f64, f64)> = curve
      .iter()
      .map(|&(y, d)| (x - half(d), y))
      .chain(curve.iter().rev().map(|&(y, d)| (x + half(d), y)))
      .collect();
    chart.draw_series([Polygon::new(outline, colour.mix(0.35).filled())])?;
  }

  // Extrema bar with min, max and mean ticks.
  let Some(stats) = BoxStats::new(&snapshot.prices) else {
    return Ok(());
  };
  let (lo, hi) = snapshot
    .prices
    .iter()
    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &p| (lo.min(p), hi.max(p)));
  let tick =
    |y: f64| PathElement::new(vec![(x - CAP_HALF_WIDTH, y), (x + CAP_HALF_WIDTH, y)], colour);
  chart.draw_series([
    PathElement::new(vec![(x, lo), (x, hi)], colour),
    tick(lo),
    tick(hi),
    tick(stats.mean),
  ])?;
  Ok(())
}

// ─── Trend chart ─────────────────────────────────────────────────────────────

/// One line per fuel type through its daily minimum price.
///
/// Returns `None` when there is no series to draw.
pub fn render_trend(minimums: &BTreeMap<String, Vec<(NaiveDate, f64)>>) -> Result<Option<String>> {
  let dates = minimums.values().flatten().map(|&(d, _)| d);
  let (Some(first), Some(last)) = (dates.clone().min(), dates.max()) else {
    return Ok(None);
  };
  let span = offset(first, last);
  let (y_min, y_max) = price_range(minimums.values().flatten().map(|&(_, p)| p));

  let mut svg = String::new();
  {
    let root = SVGBackend::with_string(&mut svg, (WIDTH, TREND_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
      .caption("Daily minimum price", ("sans-serif", 20))
      .margin(15)
      .x_label_area_size(40)
      .y_label_area_size(60)
      .build_cartesian_2d(-0.5..span + 0.5, y_min..y_max)?;

    chart
      .configure_mesh()
      .x_desc("Date")
      .y_desc("Price ($/L)")
      .x_labels(12)
      .y_labels(8)
      .x_label_formatter(&|x| day_label(first, *x))
      .y_label_formatter(&|y| format!("{y:.2}"))
      .label_style(("sans-serif", 12))
      .draw()?;

    for (i, (fuel, series)) in minimums.iter().enumerate() {
      let colour = colour(i);
      chart
        .draw_series(LineSeries::new(
          series.iter().map(|&(d, p)| (offset(first, d), p)),
          colour.stroke_width(2),
        ))?
        .label(fuel.as_str())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], colour.stroke_width(2)));
    }

    chart
      .configure_series_labels()
      .position(SeriesLabelPosition::UpperRight)
      .background_style(WHITE.mix(0.8))
      .border_style(BLACK)
      .draw()?;

    root.present()?;
  }

  Ok(Some(svg))
}

// ─── Output ──────────────────────────────────────────────────────────────────

/// Write `svg` to `path`, creating parent directories as needed.
pub fn write_svg(path: &Path, svg: &str) -> Result<()> {
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent)?;
  }
  fs::write(path, svg)?;
  info!(path = %path.display(), bytes = svg.len(), "chart written");
  Ok(())
}

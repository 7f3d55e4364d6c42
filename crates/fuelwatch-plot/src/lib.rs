//! Plot data assembly and SVG chart rendering.
//!
//! [`assemble`] replays price history into per-day snapshots of the price
//! active at each site; [`render`] draws those snapshots with plotters.

pub mod assemble;
pub mod error;
pub mod render;
mod stats;

pub use assemble::{DaySnapshot, PlotData, PlotOptions, assemble};
pub use error::{Error, Result};
pub use render::{ChartStyle, render_distribution, render_trend, write_svg};

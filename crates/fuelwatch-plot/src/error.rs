//! Error type for `fuelwatch-plot`.

use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("chart rendering failed: {0}")]
  Render(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for Error {
  fn from(err: DrawingAreaErrorKind<E>) -> Self { Self::Render(err.to_string()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Error types for `fuelwatch-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid transaction timestamp: {0:?}")]
  Timestamp(String),

  #[error("column {column} expected {expected}, found {found}")]
  ColumnType {
    column:   &'static str,
    expected: &'static str,
    found:    &'static str,
  },

  #[error("row has {found} columns, expected {expected}")]
  RowWidth { expected: usize, found: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Error type for `fuelwatch-remote`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("HTTP error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("remote returned {status}: {body}")]
  Status {
    status: reqwest::StatusCode,
    body:   String,
  },

  /// A statement was rejected by the remote database.
  #[error("remote statement failed: {message}")]
  Statement { message: String },

  /// The response did not have the shape the protocol requires.
  #[error("protocol error: {0}")]
  Protocol(String),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("core error: {0}")]
  Core(#[from] fuelwatch_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Error type for `fuelwatch-cli`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("missing required secret: {name} (env or {})", file.display())]
  MissingSecret { name: &'static str, file: PathBuf },

  #[error("failed to read secret file {}: {source}", path.display())]
  SecretFile {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Secret resolution: environment variable first, then a local file.

use std::{
  fmt,
  io::ErrorKind,
  path::{Path, PathBuf},
};

use crate::{Error, Result};

/// Subscriber token for the fuel price API.
pub const FUEL_API_TOKEN: SecretSource =
  SecretSource { env: "FUEL_API_TOKEN", file: "fuel_api_token.txt" };

/// Auth token for the remote database.
pub const TURSO_AUTH_TOKEN: SecretSource =
  SecretSource { env: "TURSO_AUTH_TOKEN", file: "turso_token.txt" };

/// A credential. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
  pub fn expose(&self) -> &str { &self.0 }

  pub fn into_inner(self) -> String { self.0 }
}

impl fmt::Debug for Secret {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("Secret(<redacted>)") }
}

/// Where one secret may be found.
#[derive(Debug, Clone, Copy)]
pub struct SecretSource {
  pub env:  &'static str,
  pub file: &'static str,
}

impl SecretSource {
  pub fn load(&self) -> Result<Secret> {
    resolve(self.env, std::env::var(self.env).ok(), Path::new(self.file))
  }
}

/// Use `env_value` unless it is blank, otherwise the trimmed contents of
/// `file`. A missing file counts as blank; any other read error is returned.
pub fn resolve(name: &'static str, env_value: Option<String>, file: &Path) -> Result<Secret> {
  let from_env = env_value.map(|v| v.trim().to_owned()).unwrap_or_default();
  if !from_env.is_empty() {
    return Ok(Secret(from_env));
  }

  let from_file = match std::fs::read_to_string(file) {
    Ok(contents) => contents.trim().to_owned(),
    Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
    Err(source) => {
      return Err(Error::SecretFile { path: file.to_path_buf(), source });
    }
  };
  if from_file.is_empty() {
    return Err(Error::MissingSecret { name, file: PathBuf::from(file) });
  }
  Ok(Secret(from_file))
}

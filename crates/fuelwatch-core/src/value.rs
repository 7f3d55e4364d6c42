//! Backend-neutral SQL values.
//!
//! Upsert statements are planned once as SQL text plus a flat list of
//! [`Value`] parameters, then executed either on the local SQLite replica or
//! shipped to the remote over HTTP. Query results travel back the same way.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A single SQL parameter or result cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
  Null,
  Integer(i64),
  Real(f64),
  Text(String),
}

impl Value {
  /// Storage class name, as SQLite reports it.
  pub fn type_name(&self) -> &'static str {
    match self {
      Value::Null => "null",
      Value::Integer(_) => "integer",
      Value::Real(_) => "real",
      Value::Text(_) => "text",
    }
  }

  pub fn is_null(&self) -> bool { matches!(self, Value::Null) }

  pub fn as_i64(&self, column: &'static str) -> Result<i64> {
    self
      .as_opt_i64(column)?
      .ok_or_else(|| mismatch(column, "integer", self))
  }

  pub fn as_opt_i64(&self, column: &'static str) -> Result<Option<i64>> {
    match self {
      Value::Null => Ok(None),
      Value::Integer(i) => Ok(Some(*i)),
      other => Err(mismatch(column, "integer", other)),
    }
  }

  pub fn as_f64(&self, column: &'static str) -> Result<f64> {
    self
      .as_opt_f64(column)?
      .ok_or_else(|| mismatch(column, "real", self))
  }

  /// Integers are widened to `f64`.
  pub fn as_opt_f64(&self, column: &'static str) -> Result<Option<f64>> {
    match self {
      Value::Null => Ok(None),
      Value::Real(r) => Ok(Some(*r)),
      Value::Integer(i) => Ok(Some(*i as f64)),
      other => Err(mismatch(column, "real", other)),
    }
  }

  pub fn as_text(&self, column: &'static str) -> Result<&str> {
    self
      .as_opt_text(column)?
      .ok_or_else(|| mismatch(column, "text", self))
  }

  pub fn as_opt_text(&self, column: &'static str) -> Result<Option<&str>> {
    match self {
      Value::Null => Ok(None),
      Value::Text(s) => Ok(Some(s)),
      other => Err(mismatch(column, "text", other)),
    }
  }
}

fn mismatch(column: &'static str, expected: &'static str, found: &Value) -> Error {
  Error::ColumnType {
    column,
    expected,
    found: found.type_name(),
  }
}

impl From<i64> for Value {
  fn from(v: i64) -> Self { Value::Integer(v) }
}

impl From<f64> for Value {
  fn from(v: f64) -> Self { Value::Real(v) }
}

impl From<String> for Value {
  fn from(v: String) -> Self { Value::Text(v) }
}

impl From<&str> for Value {
  fn from(v: &str) -> Self { Value::Text(v.to_owned()) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(v: Option<T>) -> Self { v.map_or(Value::Null, Into::into) }
}

//! Wire types for the `/v2/pipeline` endpoint.
//!
//! Only the subset used here is modelled: `execute`, `batch` and `close`
//! requests, and the results they produce. Unknown response fields are
//! ignored.

use fuelwatch_core::value::Value;
use fuelwatch_store_sqlite::upsert::Statement;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Requests ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct PipelineRequest<'a> {
  pub baton:    Option<String>,
  pub requests: Vec<StreamRequest<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamRequest<'a> {
  Execute { stmt: Stmt<'a> },
  Batch { batch: Batch<'a> },
  Close,
}

#[derive(Debug, Serialize)]
pub struct Stmt<'a> {
  pub sql:       &'a str,
  pub args:      Vec<HranaValue>,
  pub want_rows: bool,
}

impl<'a> Stmt<'a> {
  pub fn query(sql: &'a str) -> Self {
    Self { sql, args: Vec::new(), want_rows: true }
  }

  pub fn command(sql: &'a str) -> Self {
    Self { sql, args: Vec::new(), want_rows: false }
  }

  pub fn from_statement(statement: &'a Statement) -> Self {
    Self {
      sql:       &statement.sql,
      args:      statement.params.iter().map(HranaValue::from).collect(),
      want_rows: false,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct Batch<'a> {
  pub steps: Vec<BatchStep<'a>>,
}

#[derive(Debug, Serialize)]
pub struct BatchStep<'a> {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub condition: Option<Condition>,
  pub stmt:      Stmt<'a>,
}

/// Gate on the outcome of an earlier step in the same batch.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
  Ok { step: usize },
  Not { cond: Box<Condition> },
}

impl Condition {
  pub fn ok(step: usize) -> Self { Self::Ok { step } }

  pub fn failed(step: usize) -> Self {
    Self::Not { cond: Box::new(Self::ok(step)) }
  }
}

// ─── Values ──────────────────────────────────────────────────────────────────

/// Integers travel as decimal strings so that 64-bit values survive JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HranaValue {
  Null,
  Integer { value: String },
  Float { value: f64 },
  Text { value: String },
  Blob { base64: String },
}

impl From<&Value> for HranaValue {
  fn from(value: &Value) -> Self {
    match value {
      Value::Null => Self::Null,
      Value::Integer(i) => Self::Integer { value: i.to_string() },
      Value::Real(r) => Self::Float { value: *r },
      Value::Text(s) => Self::Text { value: s.clone() },
    }
  }
}

impl TryFrom<HranaValue> for Value {
  type Error = Error;

  fn try_from(value: HranaValue) -> Result<Self> {
    match value {
      HranaValue::Null => Ok(Value::Null),
      HranaValue::Integer { value } => value
        .parse()
        .map(Value::Integer)
        .map_err(|_| Error::Protocol(format!("invalid integer value {value:?}"))),
      HranaValue::Float { value } => Ok(Value::Real(value)),
      HranaValue::Text { value } => Ok(Value::Text(value)),
      HranaValue::Blob { .. } => {
        Err(Error::Protocol("unexpected blob value".into()))
      }
    }
  }
}

// ─── Responses ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PipelineResponse {
  pub results: Vec<StreamResult>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamResult {
  Ok { response: StreamResponse },
  Error { error: HranaError },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamResponse {
  Execute { result: StmtResult },
  Batch { result: BatchResult },
  Close,
}

#[derive(Debug, Default, Deserialize)]
pub struct StmtResult {
  #[serde(default)]
  pub rows:               Vec<Vec<HranaValue>>,
  #[serde(default)]
  pub affected_row_count: u64,
}

#[derive(Debug, Deserialize)]
pub struct BatchResult {
  pub step_results: Vec<Option<StmtResult>>,
  pub step_errors:  Vec<Option<HranaError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HranaError {
  pub message: String,
  #[serde(default)]
  pub code:    Option<String>,
}

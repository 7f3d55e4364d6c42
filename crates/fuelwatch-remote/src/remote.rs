//! [`HttpRemote`]: a [`RemoteStore`] over the libSQL HTTP pipeline.

use std::{fmt, iter, time::Duration};

use fuelwatch_core::{
  record::{Brand, Dataset, FuelType, PriceRecord, Site},
  remote::RemoteStore,
  value::Value,
};
use fuelwatch_store_sqlite::upsert::{Table, plan_dataset, select_all_sql};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
  Error, Result,
  hrana::{
    Batch, BatchStep, Condition, HranaError, PipelineRequest, PipelineResponse, Stmt,
    StmtResult, StreamRequest, StreamResponse, StreamResult,
  },
};

/// Connection settings for the remote database.
#[derive(Clone, Deserialize)]
pub struct RemoteConfig {
  /// `libsql://`, `https://` or `http://` database URL.
  pub url:   String,
  pub token: String,
}

impl fmt::Debug for RemoteConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RemoteConfig")
      .field("url", &self.url)
      .field("token", &"<redacted>")
      .finish()
  }
}

/// Rewrite a database URL into its pipeline endpoint.
pub fn pipeline_url(url: &str) -> String {
  let url = url.trim().trim_end_matches('/');
  let url = match url.strip_prefix("libsql://") {
    Some(host) => format!("https://{host}"),
    None => url.to_owned(),
  };
  format!("{url}/v2/pipeline")
}

/// The authoritative copy, reached over HTTP.
///
/// Every call opens and closes its own stream; no baton is carried between
/// calls.
#[derive(Clone)]
pub struct HttpRemote {
  client:   Client,
  endpoint: String,
  token:    String,
}

impl HttpRemote {
  pub fn new(config: RemoteConfig) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self {
      client,
      endpoint: pipeline_url(&config.url),
      token: config.token,
    })
  }

  pub fn endpoint(&self) -> &str { &self.endpoint }

  /// Send one pipeline and return its responses in request order.
  async fn pipeline(&self, requests: Vec<StreamRequest<'_>>) -> Result<Vec<StreamResponse>> {
    let mut req = self
      .client
      .post(&self.endpoint)
      .json(&PipelineRequest { baton: None, requests });
    if !self.token.is_empty() {
      req = req.bearer_auth(&self.token);
    }
    let resp = req.send().await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Status { status, body });
    }

    let body = resp.bytes().await?;
    let response: PipelineResponse = serde_json::from_slice(&body)?;
    response
      .results
      .into_iter()
      .map(|result| match result {
        StreamResult::Ok { response } => Ok(response),
        StreamResult::Error { error } => Err(statement_error(error)),
      })
      .collect()
  }
}

fn statement_error(error: HranaError) -> Error {
  let message = match error.code {
    Some(code) => format!("{} ({code})", error.message),
    None => error.message,
  };
  Error::Statement { message }
}

fn decode_table<T: Table>(result: Option<StmtResult>) -> Result<Vec<T>> {
  let result =
    result.ok_or_else(|| Error::Protocol(format!("no result for {}", T::NAME)))?;
  result
    .rows
    .into_iter()
    .map(|row| -> Result<T> {
      let values = row
        .into_iter()
        .map(Value::try_from)
        .collect::<Result<Vec<_>>>()?;
      Ok(T::from_values(&values)?)
    })
    .collect()
}

// ─── RemoteStore impl ────────────────────────────────────────────────────────

impl RemoteStore for HttpRemote {
  type Error = Error;

  /// Executes the whole plan as one batch inside a transaction.
  ///
  /// Each statement runs only if the previous step succeeded; the commit
  /// runs only after the last statement, and a rollback runs if the commit
  /// did not. The first failing step is reported.
  async fn push(&self, dataset: &Dataset) -> Result<usize> {
    let plan = plan_dataset(dataset);
    if plan.is_empty() {
      return Ok(0);
    }
    let last = plan.len();
    let commit = last + 1;

    let steps: Vec<BatchStep<'_>> = iter::once(BatchStep {
      condition: None,
      stmt:      Stmt::command("BEGIN"),
    })
    .chain(plan.iter().enumerate().map(|(i, statement)| BatchStep {
      condition: Some(Condition::ok(i)),
      stmt:      Stmt::from_statement(statement),
    }))
    .chain([
      BatchStep {
        condition: Some(Condition::ok(last)),
        stmt:      Stmt::command("COMMIT"),
      },
      BatchStep {
        condition: Some(Condition::failed(commit)),
        stmt:      Stmt::command("ROLLBACK"),
      },
    ])
    .collect();

    let responses = self
      .pipeline(vec![
        StreamRequest::Execute { stmt: Stmt::command("PRAGMA foreign_keys = ON") },
        StreamRequest::Batch { batch: Batch { steps } },
        StreamRequest::Close,
      ])
      .await?;

    let result = responses
      .into_iter()
      .find_map(|response| match response {
        StreamResponse::Batch { result } => Some(result),
        _ => None,
      })
      .ok_or_else(|| Error::Protocol("no batch result".into()))?;

    if let Some(error) = result.step_errors.into_iter().flatten().next() {
      return Err(statement_error(error));
    }
    if !matches!(result.step_results.get(commit), Some(Some(_))) {
      return Err(Error::Protocol("transaction was not committed".into()));
    }

    for (statement, outcome) in plan.iter().zip(result.step_results.iter().skip(1)) {
      if let Some(outcome) = outcome {
        debug!(
          table = statement.table,
          rows = statement.rows,
          affected = outcome.affected_row_count,
          "remote upsert chunk applied"
        );
      }
    }
    info!(statements = last, "remote batch committed");
    Ok(last)
  }

  async fn pull(&self) -> Result<Dataset> {
    let queries = [
      select_all_sql::<Brand>(),
      select_all_sql::<FuelType>(),
      select_all_sql::<Site>(),
      select_all_sql::<PriceRecord>(),
    ];
    let requests = queries
      .iter()
      .map(|sql| StreamRequest::Execute { stmt: Stmt::query(sql) })
      .chain(iter::once(StreamRequest::Close))
      .collect();

    let mut results = self
      .pipeline(requests)
      .await?
      .into_iter()
      .filter_map(|response| match response {
        StreamResponse::Execute { result } => Some(result),
        _ => None,
      });

    let dataset = Dataset {
      brands:     decode_table(results.next())?,
      fuel_types: decode_table(results.next())?,
      sites:      decode_table(results.next())?,
      prices:     decode_table(results.next())?,
    };
    debug!(counts = %dataset.counts(), "read remote tables");
    Ok(dataset)
  }
}

//! Lot data sources.
//!
//! A source returns validated lot records for a filter. Payloads must be a
//! homogeneous JSON array of lot records with unique, non-empty ids; anything
//! else is a `FetchError::MalformedPayload`.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::filter::Filter;
use crate::lot::{LotId, LotRecord};
use crate::version::PARKVIEW_VERSION;

#[async_trait]
pub trait LotSource: Send + Sync {
    async fn fetch(&self, filter: &Filter) -> Result<Vec<LotRecord>, FetchError>;
}

/// Decode and validate a `GET /api/lots` response body.
pub fn decode_records(body: &[u8]) -> Result<Vec<LotRecord>, FetchError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| FetchError::malformed(format!("invalid JSON: {e}")))?;

    let items = match value {
        serde_json::Value::Array(items) => items,
        other => {
            return Err(FetchError::malformed(format!(
                "expected a JSON array of lots, got {}",
                json_kind(&other)
            )));
        }
    };

    validate_records(
        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value::<LotRecord>(item)
                    .map_err(|e| FetchError::malformed(format!("lot #{index}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?,
    )
}

/// Reject empty and duplicate ids.
pub fn validate_records(records: Vec<LotRecord>) -> Result<Vec<LotRecord>, FetchError> {
    check_ids(records.iter().map(|record| &record.id))?;
    Ok(records)
}

pub(crate) fn check_ids<'a>(ids: impl Iterator<Item = &'a LotId>) -> Result<(), FetchError> {
    let mut seen = HashSet::new();
    for (index, id) in ids.enumerate() {
        if id.as_str().trim().is_empty() {
            return Err(FetchError::malformed(format!("lot #{index}: empty id")));
        }
        if !seen.insert(id) {
            return Err(FetchError::malformed(format!(
                "lot #{index}: duplicate id '{id}'"
            )));
        }
    }
    Ok(())
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Fetches lots from a remote `GET /api/lots` endpoint.
pub struct HttpLotSource {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpLotSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(format!("parkview/{}", PARKVIEW_VERSION))
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Request(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            endpoint: format!("{}/api/lots", base_url.trim_end_matches('/')),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LotSource for HttpLotSource {
    async fn fetch(&self, filter: &Filter) -> Result<Vec<LotRecord>, FetchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&filter.query_pairs())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, endpoint = %self.endpoint, "Lot fetch returned error status");
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let records = decode_records(&body)?;
        tracing::debug!(count = records.len(), "Fetched lots");
        Ok(records)
    }
}

/// Fixed record set, regardless of filter.
#[derive(Debug, Clone, Default)]
pub struct StaticLotSource {
    records: Vec<LotRecord>,
}

impl StaticLotSource {
    pub fn new(records: Vec<LotRecord>) -> Result<Self, FetchError> {
        Ok(Self {
            records: validate_records(records)?,
        })
    }
}

#[async_trait]
impl LotSource for StaticLotSource {
    async fn fetch(&self, _filter: &Filter) -> Result<Vec<LotRecord>, FetchError> {
        Ok(self.records.clone())
    }
}

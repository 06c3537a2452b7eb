//! Server-side lot catalog.
//!
//! The catalog is the static list of lots a server knows about. Availability
//! is not stored; it is computed by the rule engine for each request.

use std::path::Path;

use async_trait::async_trait;

use crate::availability::is_available_for;
use crate::error::FetchError;
use crate::filter::Filter;
use crate::lot::{Lot, LotRecord};
use crate::source::{LotSource, decode_records, validate_records};

#[derive(Debug, Clone, Default)]
pub struct LotCatalog {
    records: Vec<LotRecord>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid catalog {path}: {source}")]
    Invalid { path: String, source: FetchError },
}

impl LotCatalog {
    pub fn from_records(records: Vec<LotRecord>) -> Result<Self, FetchError> {
        Ok(Self::strip(validate_records(records)?))
    }

    pub fn from_json(body: &[u8]) -> Result<Self, FetchError> {
        Ok(Self::strip(decode_records(body)?))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let body = std::fs::read(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&body).map_err(|source| CatalogError::Invalid {
            path: path.display().to_string(),
            source,
        })
    }

    // Any stored availability flags are ignored; the engine decides per request.
    fn strip(mut records: Vec<LotRecord>) -> Self {
        for record in &mut records {
            record.available = None;
        }
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[LotRecord] {
        &self.records
    }

    /// Every lot, evaluated for `filter`.
    pub fn evaluate(&self, filter: &Filter) -> Vec<Lot> {
        self.records
            .iter()
            .map(|record| {
                let available = is_available_for(record.lot_type, filter);
                Lot::from_record(record.clone(), available)
            })
            .collect()
    }
}

/// In-process stand-in for the HTTP endpoint: records carry server-computed flags.
#[async_trait]
impl LotSource for LotCatalog {
    async fn fetch(&self, filter: &Filter) -> Result<Vec<LotRecord>, FetchError> {
        Ok(self
            .evaluate(filter)
            .into_iter()
            .map(|lot| {
                LotRecord::new(lot.id, lot.name, lot.lot_type, lot.position)
                    .with_restrictions(lot.restrictions)
                    .with_available(lot.available)
            })
            .collect())
    }
}

//! In-memory lot registry: the current lot set and nothing else.

use crate::availability::AvailabilityMode;
use crate::error::FetchError;
use crate::filter::Filter;
use crate::lot::{Lot, LotId, LotRecord};
use crate::source::{LotSource, check_ids};

/// Ordered set of lots with availability resolved for one filter.
///
/// Replacement is all-or-nothing: a failed fetch leaves the previous set intact.
#[derive(Debug, Clone, Default)]
pub struct LotRegistry {
    lots: Vec<Lot>,
}

impl LotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids must be non-empty and unique, as for a fetched payload.
    pub fn from_lots(lots: Vec<Lot>) -> Result<Self, FetchError> {
        check_ids(lots.iter().map(|lot| &lot.id))?;
        Ok(Self { lots })
    }

    pub fn lots(&self) -> &[Lot] {
        &self.lots
    }

    pub fn len(&self) -> usize {
        self.lots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    pub fn get(&self, id: &LotId) -> Option<&Lot> {
        self.lots.iter().find(|lot| &lot.id == id)
    }

    pub fn contains(&self, id: &LotId) -> bool {
        self.get(id).is_some()
    }

    /// Resolve a fetch result and swap it in.
    ///
    /// Resolution happens before anything is touched, so an error (including a
    /// resolution error such as a missing server flag) never mutates the registry.
    pub fn apply(
        &mut self,
        fetched: Result<Vec<LotRecord>, FetchError>,
        filter: &Filter,
        mode: AvailabilityMode,
    ) -> Result<&[Lot], FetchError> {
        let lots = mode.resolve(fetched?, filter)?;
        check_ids(lots.iter().map(|lot| &lot.id))?;
        self.lots = lots;
        Ok(&self.lots)
    }

    /// Fetch from `source` and replace the lot set on success.
    pub async fn refresh(
        &mut self,
        source: &dyn LotSource,
        filter: &Filter,
        mode: AvailabilityMode,
    ) -> Result<&[Lot], FetchError> {
        let fetched = source.fetch(filter).await;
        if let Err(ref e) = fetched {
            tracing::warn!(error = %e, "Lot refresh failed, keeping previous lots");
        }
        self.apply(fetched, filter, mode)
    }
}

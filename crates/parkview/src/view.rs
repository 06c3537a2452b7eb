//! Data handed to the list and details panels.

use serde::Serialize;

use crate::lot::{Lot, LotId, LotType, Position};
use crate::registry::LotRegistry;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListEntry {
    pub id: LotId,
    pub name: String,
    #[serde(rename = "type")]
    pub lot_type: LotType,
    pub available: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LotDetails {
    pub id: LotId,
    pub name: String,
    #[serde(rename = "type")]
    pub lot_type: LotType,
    pub position: Position,
    pub restrictions: String,
    pub available: bool,
}

impl From<&Lot> for LotDetails {
    fn from(lot: &Lot) -> Self {
        Self {
            id: lot.id.clone(),
            name: lot.name.clone(),
            lot_type: lot.lot_type,
            position: lot.position,
            restrictions: lot.restrictions.clone(),
            available: lot.available,
        }
    }
}

impl LotDetails {
    /// Popup text for the lot's marker.
    pub fn summary(&self) -> String {
        format!(
            "{} ({}) - {}",
            self.name,
            self.lot_type,
            if self.available {
                "available"
            } else {
                "unavailable"
            }
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "panel", rename_all = "lowercase")]
pub enum DetailsPanel {
    #[default]
    Hidden,
    Shown(LotDetails),
}

impl DetailsPanel {
    pub fn is_hidden(&self) -> bool {
        matches!(self, Self::Hidden)
    }

    pub fn details(&self) -> Option<&LotDetails> {
        match self {
            Self::Shown(details) => Some(details),
            Self::Hidden => None,
        }
    }
}

pub fn list_entries(registry: &LotRegistry, selected: Option<&LotId>) -> Vec<ListEntry> {
    registry
        .lots()
        .iter()
        .map(|lot| ListEntry {
            id: lot.id.clone(),
            name: lot.name.clone(),
            lot_type: lot.lot_type,
            available: lot.available,
            selected: selected == Some(&lot.id),
        })
        .collect()
}

pub fn details_panel(lot: Option<&Lot>) -> DetailsPanel {
    lot.map_or(DetailsPanel::Hidden, |lot| DetailsPanel::Shown(lot.into()))
}

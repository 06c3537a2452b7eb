//! Marker visual states and their drawing styles.
//!
//! Visual state is always derived from (lot availability, selection) and never
//! stored on its own. `VisualMap::diff` turns two derivations into the minimal
//! set of marker calls for the map widget.

use std::collections::HashMap;

use serde::Serialize;

use crate::lot::{LotId, Position};

pub const AVAILABLE_FILL: &str = "#28a745";
pub const UNAVAILABLE_FILL: &str = "#6c757d";
pub const NORMAL_BORDER: &str = "#333";
pub const HIGHLIGHT_BORDER: &str = "#0051ba";
pub const GREYED_BORDER: &str = "#999999";
pub const GREYED_FILL: &str = "#cccccc";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum MarkerVisual {
    /// Coloured by availability.
    Normal { available: bool },
    /// The selected lot. Fill still follows availability.
    Highlighted { available: bool },
    /// De-emphasised while another lot is selected.
    Greyed,
}

impl MarkerVisual {
    pub fn is_highlighted(&self) -> bool {
        matches!(self, Self::Highlighted { .. })
    }

    pub fn is_greyed(&self) -> bool {
        matches!(self, Self::Greyed)
    }

    pub fn is_normal(&self) -> bool {
        matches!(self, Self::Normal { .. })
    }

    pub fn style(&self) -> MarkerStyle {
        match *self {
            Self::Normal { available } => MarkerStyle {
                radius: 7,
                color: NORMAL_BORDER,
                weight: 2,
                fill_color: availability_fill(available),
                fill_opacity: 0.8,
            },
            Self::Highlighted { available } => MarkerStyle {
                radius: 10,
                color: HIGHLIGHT_BORDER,
                weight: 3,
                fill_color: availability_fill(available),
                fill_opacity: 0.9,
            },
            Self::Greyed => MarkerStyle {
                radius: 7,
                color: GREYED_BORDER,
                weight: 1,
                fill_color: GREYED_FILL,
                fill_opacity: 0.5,
            },
        }
    }
}

fn availability_fill(available: bool) -> &'static str {
    if available {
        AVAILABLE_FILL
    } else {
        UNAVAILABLE_FILL
    }
}

/// Circle-marker style as handed to the map widget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    pub radius: u32,
    pub color: &'static str,
    pub weight: u32,
    pub fill_color: &'static str,
    pub fill_opacity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerState {
    pub id: LotId,
    pub position: Position,
    pub visual: MarkerVisual,
}

/// One marker call needed to move the map from one visual map to another.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerChange {
    Place {
        id: LotId,
        position: Position,
        style: MarkerStyle,
    },
    Restyle {
        id: LotId,
        style: MarkerStyle,
    },
    Remove {
        id: LotId,
    },
}

/// Visual state of every marker, in registry order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisualMap {
    markers: Vec<MarkerState>,
}

impl VisualMap {
    pub fn new(markers: Vec<MarkerState>) -> Self {
        Self { markers }
    }

    pub fn markers(&self) -> &[MarkerState] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn visual(&self, id: &LotId) -> Option<MarkerVisual> {
        self.markers
            .iter()
            .find(|m| &m.id == id)
            .map(|m| m.visual)
    }

    pub fn highlighted(&self) -> impl Iterator<Item = &MarkerState> {
        self.markers.iter().filter(|m| m.visual.is_highlighted())
    }

    /// Calls that turn `self` (what is on the map) into `next`.
    ///
    /// Removals come first, then placements and restyles in `next` order.
    pub fn diff(&self, next: &VisualMap) -> Vec<MarkerChange> {
        let current: HashMap<&LotId, &MarkerState> =
            self.markers.iter().map(|m| (&m.id, m)).collect();
        let retained: HashMap<&LotId, &MarkerState> =
            next.markers.iter().map(|m| (&m.id, m)).collect();

        let mut changes: Vec<MarkerChange> = self
            .markers
            .iter()
            .filter(|m| match retained.get(&m.id) {
                None => true,
                Some(n) => n.position != m.position,
            })
            .map(|m| MarkerChange::Remove { id: m.id.clone() })
            .collect();

        for marker in &next.markers {
            match current.get(&marker.id) {
                Some(old) if old.position == marker.position => {
                    if old.visual != marker.visual {
                        changes.push(MarkerChange::Restyle {
                            id: marker.id.clone(),
                            style: marker.visual.style(),
                        });
                    }
                }
                _ => changes.push(MarkerChange::Place {
                    id: marker.id.clone(),
                    position: marker.position,
                    style: marker.visual.style(),
                }),
            }
        }

        changes
    }
}

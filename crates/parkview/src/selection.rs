//! Marker/selection state machine.
//!
//! At most one lot is selected. The marker of the selected lot is
//! `Highlighted`; what happens to the rest is decided by `SelectionPolicy`.
//! Visuals are recomputed from scratch on every transition.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::lot::{Lot, LotId};
use crate::marker::{MarkerState, MarkerVisual, VisualMap};
use crate::registry::LotRegistry;

/// How unselected markers look while a selection exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Every other marker is `Greyed`.
    #[default]
    GreyOthers,
    /// Every other marker stays `Normal`.
    KeepOthersNormal,
}

impl FromStr for SelectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grey" | "gray" | "grey_others" => Ok(Self::GreyOthers),
            "normal" | "keep_others_normal" => Ok(Self::KeepOthersNormal),
            other => Err(format!(
                "unknown selection policy '{other}', expected 'grey' or 'normal'"
            )),
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::GreyOthers => "grey",
            Self::KeepOthersNormal => "normal",
        })
    }
}

/// What `reconcile_after_refresh` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// Nothing was selected.
    Idle,
    /// The selected lot survived the refresh and stays selected.
    Kept,
    /// The selected lot disappeared; the selection was cleared.
    Cleared,
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    selected: Option<LotId>,
    policy: SelectionPolicy,
}

impl Selection {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self {
            selected: None,
            policy,
        }
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    pub fn selected(&self) -> Option<&LotId> {
        self.selected.as_ref()
    }

    /// The selected lot, if it is still in `registry`.
    pub fn selected_lot<'a>(&self, registry: &'a LotRegistry) -> Option<&'a Lot> {
        self.selected.as_ref().and_then(|id| registry.get(id))
    }

    /// Select `id`. Unknown ids leave the state untouched and return `false`.
    pub fn select(&mut self, registry: &LotRegistry, id: &LotId) -> bool {
        if !registry.contains(id) {
            tracing::debug!(lot_id = %id, "Ignoring selection of unknown lot");
            return false;
        }
        if let Some(previous) = self.selected.replace(id.clone())
            && &previous != id
        {
            tracing::debug!(previous = %previous, lot_id = %id, "Selection moved");
        }
        true
    }

    /// Clear the selection. Returns the lot that was selected.
    pub fn deselect(&mut self) -> Option<LotId> {
        self.selected.take()
    }

    /// Keep the selection only if its lot is still in the refreshed registry.
    pub fn reconcile_after_refresh(&mut self, registry: &LotRegistry) -> Reconciliation {
        match &self.selected {
            None => Reconciliation::Idle,
            Some(id) if registry.contains(id) => Reconciliation::Kept,
            Some(id) => {
                tracing::info!(lot_id = %id, "Selected lot no longer listed, clearing selection");
                self.selected = None;
                Reconciliation::Cleared
            }
        }
    }

    pub fn visual_for(&self, lot: &Lot) -> MarkerVisual {
        derive_visual(self.selected.as_ref(), self.policy, lot)
    }

    /// Derive every marker's visual state from scratch.
    pub fn visuals(&self, registry: &LotRegistry) -> VisualMap {
        // A selection whose lot vanished must not grey out the whole map.
        let selected = self.selected_lot(registry).map(|lot| &lot.id);

        VisualMap::new(
            registry
                .lots()
                .iter()
                .map(|lot| MarkerState {
                    id: lot.id.clone(),
                    position: lot.position,
                    visual: derive_visual(selected, self.policy, lot),
                })
                .collect(),
        )
    }
}

fn derive_visual(selected: Option<&LotId>, policy: SelectionPolicy, lot: &Lot) -> MarkerVisual {
    match selected {
        Some(id) if id == &lot.id => MarkerVisual::Highlighted {
            available: lot.available,
        },
        Some(_) if policy == SelectionPolicy::GreyOthers => MarkerVisual::Greyed,
        _ => MarkerVisual::Normal {
            available: lot.available,
        },
    }
}

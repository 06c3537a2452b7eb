//! ParkingController: the single owner of lot and selection state.
//!
//! Every user action and every fetch completion goes through one of the
//! transition methods below, each of which returns a `ViewUpdate` describing
//! what the presentation layer must change. Nothing here touches a widget.
//!
//! Fetches are sequenced with `FetchTicket`s. Only the most recently issued
//! ticket may change the registry; completions of older tickets are dropped
//! whenever they arrive.

use crate::availability::AvailabilityMode;
use crate::config::ClientConfig;
use crate::error::FetchError;
use crate::filter::Filter;
use crate::lot::{LotId, LotRecord, Position};
use crate::marker::{MarkerChange, VisualMap};
use crate::registry::LotRegistry;
use crate::selection::{Reconciliation, Selection, SelectionPolicy};
use crate::view::{DetailsPanel, ListEntry, details_panel, list_entries};

/// Handle for one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    filter: Filter,
}

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }
}

/// Everything the presentation layer has to redraw after a transition.
///
/// `None` fields are unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewUpdate {
    pub markers: Vec<MarkerChange>,
    pub list: Option<Vec<ListEntry>>,
    pub details: Option<DetailsPanel>,
    pub focus: Option<Position>,
    pub notice: Option<String>,
}

impl ViewUpdate {
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
            && self.list.is_none()
            && self.details.is_none()
            && self.focus.is_none()
            && self.notice.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// The lot set was replaced.
    Applied {
        update: ViewUpdate,
        reconciliation: Reconciliation,
    },
    /// A newer fetch was issued after this one; the result was dropped.
    Stale,
    /// The fetch failed; lots and selection are unchanged.
    Failed { error: FetchError, update: ViewUpdate },
}

pub struct ParkingController {
    mode: AvailabilityMode,
    registry: LotRegistry,
    selection: Selection,
    /// Filter the current lot set was resolved with.
    filter: Option<Filter>,
    /// What the map currently shows.
    rendered: VisualMap,
    issued: u64,
    in_flight: Option<FetchTicket>,
}

impl ParkingController {
    pub fn new(mode: AvailabilityMode, policy: SelectionPolicy) -> Self {
        Self {
            mode,
            registry: LotRegistry::new(),
            selection: Selection::new(policy),
            filter: None,
            rendered: VisualMap::default(),
            issued: 0,
            in_flight: None,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.availability_mode, config.selection_policy)
    }

    pub fn mode(&self) -> AvailabilityMode {
        self.mode
    }

    pub fn registry(&self) -> &LotRegistry {
        &self.registry
    }

    pub fn selected(&self) -> Option<&LotId> {
        self.selection.selected()
    }

    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    /// Marker visuals as last handed to the presentation layer.
    pub fn visuals(&self) -> &VisualMap {
        &self.rendered
    }

    pub fn details(&self) -> DetailsPanel {
        details_panel(self.selection.selected_lot(&self.registry))
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Filter of the newest fetch, or of the current lot set if none is pending.
    pub fn requested_filter(&self) -> Option<Filter> {
        self.in_flight.map(|t| t.filter).or(self.filter)
    }

    /// Issue a new fetch. Any fetch issued earlier becomes stale.
    pub fn begin_refresh(&mut self, filter: Filter) -> FetchTicket {
        self.issued += 1;
        let ticket = FetchTicket {
            seq: self.issued,
            filter,
        };
        if let Some(superseded) = self.in_flight.replace(ticket) {
            tracing::debug!(superseded = superseded.seq, seq = ticket.seq, "Superseding in-flight fetch");
        }
        tracing::debug!(
            seq = ticket.seq,
            permit = %filter.permit,
            day = %filter.day,
            time = %filter.time,
            "Issued lot fetch"
        );
        ticket
    }

    pub fn complete_refresh(
        &mut self,
        ticket: FetchTicket,
        fetched: Result<Vec<LotRecord>, FetchError>,
    ) -> RefreshOutcome {
        if self.in_flight.map(|t| t.seq) != Some(ticket.seq) {
            tracing::debug!(seq = ticket.seq, latest = self.issued, "Discarding stale fetch result");
            return RefreshOutcome::Stale;
        }
        self.in_flight = None;

        if let Err(error) = self.registry.apply(fetched, &ticket.filter, self.mode) {
            tracing::warn!(seq = ticket.seq, error = %error, "Lot refresh failed, keeping previous lots");
            let update = ViewUpdate {
                notice: Some(format!("Could not load parking lots: {error}")),
                ..Default::default()
            };
            return RefreshOutcome::Failed { error, update };
        }

        self.filter = Some(ticket.filter);
        let reconciliation = self.selection.reconcile_after_refresh(&self.registry);
        tracing::info!(
            seq = ticket.seq,
            lots = self.registry.len(),
            ?reconciliation,
            "Applied lot refresh"
        );

        RefreshOutcome::Applied {
            update: self.render(None),
            reconciliation,
        }
    }

    /// Select a lot. Unknown ids are ignored and produce no update.
    pub fn select(&mut self, id: &LotId) -> Option<ViewUpdate> {
        if !self.selection.select(&self.registry, id) {
            return None;
        }
        let focus = self.registry.get(id).map(|lot| lot.position);
        Some(self.render(focus))
    }

    pub fn deselect(&mut self) -> ViewUpdate {
        if let Some(previous) = self.selection.deselect() {
            tracing::debug!(lot_id = %previous, "Cleared selection");
        }
        self.render(None)
    }

    /// Recompute visuals from scratch and diff them against what is on the map.
    fn render(&mut self, focus: Option<Position>) -> ViewUpdate {
        let next = self.selection.visuals(&self.registry);
        let markers = self.rendered.diff(&next);
        self.rendered = next;

        ViewUpdate {
            markers,
            list: Some(list_entries(&self.registry, self.selection.selected())),
            details: Some(self.details()),
            focus,
            notice: None,
        }
    }
}

//! Presentation collaborators and the adapter that drives them.
//!
//! The map widget and the side panels are external; they only ever see the
//! calls made by `PresentationAdapter::apply`.

use crate::config::ClientConfig;
use crate::controller::ViewUpdate;
use crate::lot::{LotId, Position};
use crate::marker::{MarkerChange, MarkerStyle};
use crate::view::{DetailsPanel, ListEntry};

/// Map widget with circular markers.
pub trait MapWidget {
    fn place_marker(&mut self, id: &LotId, position: Position, style: &MarkerStyle);
    fn set_marker_style(&mut self, id: &LotId, style: &MarkerStyle);
    fn remove_marker(&mut self, id: &LotId);
    fn show_popup(&mut self, id: &LotId, text: &str);
    fn hide_popup(&mut self);
    /// Centre the map on `position`. `None` keeps the current zoom.
    fn pan_to(&mut self, position: Position, zoom: Option<u8>);
}

/// List and details panels.
pub trait PanelRenderer {
    fn render_list(&mut self, entries: &[ListEntry]);
    fn render_details(&mut self, panel: &DetailsPanel);
    fn show_notice(&mut self, message: &str);
}

pub struct PresentationAdapter<M, P> {
    map: M,
    panels: P,
    focus_zoom: Option<u8>,
}

impl<M: MapWidget, P: PanelRenderer> PresentationAdapter<M, P> {
    pub fn new(map: M, panels: P, focus_zoom: Option<u8>) -> Self {
        Self {
            map,
            panels,
            focus_zoom,
        }
    }

    pub fn from_config(map: M, panels: P, config: &ClientConfig) -> Self {
        Self::new(map, panels, config.focus_zoom)
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn panels(&self) -> &P {
        &self.panels
    }

    pub fn into_parts(self) -> (M, P) {
        (self.map, self.panels)
    }

    pub fn apply(&mut self, update: &ViewUpdate) {
        for change in &update.markers {
            match change {
                MarkerChange::Place {
                    id,
                    position,
                    style,
                } => self.map.place_marker(id, *position, style),
                MarkerChange::Restyle { id, style } => self.map.set_marker_style(id, style),
                MarkerChange::Remove { id } => self.map.remove_marker(id),
            }
        }

        if let Some(entries) = &update.list {
            self.panels.render_list(entries);
        }

        if let Some(panel) = &update.details {
            self.panels.render_details(panel);
            match panel {
                DetailsPanel::Shown(details) => self.map.show_popup(&details.id, &details.summary()),
                DetailsPanel::Hidden => self.map.hide_popup(),
            }
        }

        if let Some(position) = update.focus {
            self.map.pan_to(position, self.focus_zoom);
        }

        if let Some(notice) = &update.notice {
            self.panels.show_notice(notice);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Call, Recorder};
    use super::*;
    use crate::availability::AvailabilityMode;
    use crate::controller::ParkingController;
    use crate::error::FetchError;
    use crate::filter::Filter;
    use crate::lot::{Day, LotRecord, LotType, Permit};
    use crate::marker::{GREYED_BORDER, HIGHLIGHT_BORDER};
    use crate::selection::SelectionPolicy;

    fn adapter() -> (PresentationAdapter<Recorder, Recorder>, Recorder) {
        let recorder = Recorder::default();
        (
            PresentationAdapter::new(recorder.clone(), recorder.clone(), Some(17)),
            recorder,
        )
    }

    fn controller() -> ParkingController {
        let mut controller = ParkingController::new(AvailabilityMode::Local, SelectionPolicy::GreyOthers);
        let ticket = controller.begin_refresh(Filter::new(Permit::None, Day::Sun, "09:00".parse().unwrap()));
        let pos = Position::new(40.5, -74.4).unwrap();
        controller.complete_refresh(
            ticket,
            Ok(vec![
                LotRecord::new("A", "Lot A", LotType::Yellow, pos),
                LotRecord::new("B", "Lot B", LotType::Red, pos),
            ]),
        );
        controller
    }

    #[test]
    fn initial_render_places_markers_and_lists_lots() {
        let (mut adapter, recorder) = adapter();
        let mut controller = ParkingController::new(AvailabilityMode::Local, SelectionPolicy::GreyOthers);
        let ticket = controller.begin_refresh(Filter::new(Permit::None, Day::Sun, "09:00".parse().unwrap()));
        let crate::controller::RefreshOutcome::Applied { update, .. } = controller.complete_refresh(
            ticket,
            Ok(vec![LotRecord::new("A", "Lot A", LotType::Yellow, Position::new(40.5, -74.4).unwrap())]),
        ) else {
            panic!("expected refresh to apply");
        };

        adapter.apply(&update);

        assert_eq!(
            recorder.calls(),
            vec![
                Call::Place("A".into()),
                Call::List(vec!["A".into()]),
                Call::Details(None),
                Call::HidePopup,
            ]
        );
    }

    #[test]
    fn selection_restyles_pans_and_shows_popup() {
        let (mut adapter, recorder) = adapter();
        let mut controller = controller();

        let update = controller.select(&LotId::from("B")).unwrap();
        adapter.apply(&update);

        assert_eq!(
            recorder.calls(),
            vec![
                Call::Restyle("A".into(), GREYED_BORDER),
                Call::Restyle("B".into(), HIGHLIGHT_BORDER),
                Call::List(vec!["A".into(), "B".into()]),
                Call::Details(Some("B".into())),
                Call::Popup("B".into()),
                Call::PanTo(Some(17)),
            ]
        );
    }

    #[test]
    fn selection_keeps_current_zoom_by_default() {
        let recorder = Recorder::default();
        let config = ClientConfig {
            focus_zoom: None,
            ..ClientConfig::default()
        };
        let mut adapter = PresentationAdapter::from_config(recorder.clone(), recorder.clone(), &config);
        let mut controller = controller();

        adapter.apply(&controller.select(&LotId::from("A")).unwrap());

        assert!(recorder.calls().contains(&Call::PanTo(None)));
    }

    #[test]
    fn failure_only_shows_notice() {
        let (mut adapter, recorder) = adapter();
        let mut controller = controller();

        let ticket = controller.begin_refresh(Filter::new(Permit::Red, Day::Mon, "09:00".parse().unwrap()));
        let crate::controller::RefreshOutcome::Failed { update, .. } =
            controller.complete_refresh(ticket, Err(FetchError::Status(502)))
        else {
            panic!("expected failure");
        };
        adapter.apply(&update);

        let calls = recorder.calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(&calls[0], Call::Notice(msg) if msg.contains("502")));
    }
}

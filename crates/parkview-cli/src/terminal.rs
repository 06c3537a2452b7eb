//! Terminal stand-ins for the map widget and the side panels.

use std::io::{self, Write};

use parkview::{DetailsPanel, ListEntry, LotId, MapWidget, MarkerStyle, PanelRenderer, Position};

/// There is no map on a terminal; marker traffic goes to the debug log.
#[derive(Debug, Default)]
pub struct LoggedMap;

impl MapWidget for LoggedMap {
    fn place_marker(&mut self, id: &LotId, position: Position, style: &MarkerStyle) {
        tracing::debug!(lot_id = %id, lat = position.lat, lng = position.lng, color = style.color, "Place marker");
    }

    fn set_marker_style(&mut self, id: &LotId, style: &MarkerStyle) {
        tracing::debug!(lot_id = %id, color = style.color, radius = style.radius, "Restyle marker");
    }

    fn remove_marker(&mut self, id: &LotId) {
        tracing::debug!(lot_id = %id, "Remove marker");
    }

    fn show_popup(&mut self, id: &LotId, text: &str) {
        tracing::debug!(lot_id = %id, text, "Show popup");
    }

    fn hide_popup(&mut self) {}

    fn pan_to(&mut self, position: Position, zoom: Option<u8>) {
        tracing::debug!(lat = position.lat, lng = position.lng, ?zoom, "Pan map");
    }
}

/// Keeps the latest list and details so they can be printed once at the end.
#[derive(Debug, Default)]
pub struct TerminalPanels {
    list: Vec<ListEntry>,
    details: DetailsPanel,
}

impl TerminalPanels {
    /// One line per lot (`id name type availability`, `*` marks the
    /// selection), then the details block if a lot is selected.
    pub fn print(&self, out: &mut impl Write) -> io::Result<()> {
        for entry in &self.list {
            writeln!(
                out,
                "{}{}\t{}\t{}\t{}",
                if entry.selected { "*" } else { "" },
                entry.id,
                entry.name,
                entry.lot_type,
                availability(entry.available)
            )?;
        }

        if let Some(details) = self.details.details() {
            writeln!(out)?;
            writeln!(out, "{}", details.summary())?;
            writeln!(out, "  position: {:.5}, {:.5}", details.position.lat, details.position.lng)?;
            if !details.restrictions.is_empty() {
                writeln!(out, "  restrictions: {}", details.restrictions)?;
            }
        }
        Ok(())
    }
}

impl PanelRenderer for TerminalPanels {
    fn render_list(&mut self, entries: &[ListEntry]) {
        self.list = entries.to_vec();
    }

    fn render_details(&mut self, panel: &DetailsPanel) {
        self.details = panel.clone();
    }

    fn show_notice(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

fn availability(available: bool) -> &'static str {
    if available { "available" } else { "unavailable" }
}

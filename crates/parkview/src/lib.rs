//! parkview: campus parking availability engine and map view controller.

mod catalog;
mod error;
mod filter;
mod version;

pub mod availability;
pub mod config;
pub mod controller;
pub mod lot;
pub mod marker;
pub mod presenter;
pub mod registry;
pub mod selection;
pub mod session;
pub mod source;
pub mod transport;
pub mod view;

pub use availability::{AvailabilityMode, evaluate, is_available};
pub use catalog::{CatalogError, LotCatalog};
pub use config::ClientConfig;
pub use controller::{FetchTicket, ParkingController, RefreshOutcome, ViewUpdate};
pub use error::{FetchError, ParseError};
pub use filter::Filter;
pub use lot::{Day, Lot, LotId, LotRecord, LotType, Permit, Position, TimeOfDay};
pub use marker::{MarkerChange, MarkerStyle, MarkerVisual, VisualMap};
pub use presenter::{MapWidget, PanelRenderer, PresentationAdapter};
pub use registry::LotRegistry;
pub use selection::{Reconciliation, Selection, SelectionPolicy};
pub use session::{Command, Session};
pub use source::{HttpLotSource, LotSource, StaticLotSource};
pub use version::{PARKVIEW_VERSION, VersionInfo};
pub use view::{DetailsPanel, ListEntry, LotDetails};

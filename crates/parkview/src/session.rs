//! Event loop that drives a `ParkingController` from user commands and fetch
//! completions.
//!
//! All state changes happen on the task running `Session::run`. Fetches run
//! as spawned tasks and report back over a channel, so the previous lots stay
//! interactive while a fetch is outstanding.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::controller::{FetchTicket, ParkingController, RefreshOutcome};
use crate::error::FetchError;
use crate::filter::Filter;
use crate::lot::{LotId, LotRecord};
use crate::presenter::{MapWidget, PanelRenderer, PresentationAdapter};
use crate::source::LotSource;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// New permit/day/time: fetch and re-evaluate every lot.
    SetFilter(Filter),
    /// Fetch again with the most recently requested filter.
    Refresh,
    Select(LotId),
    Deselect,
}

type Completion = (FetchTicket, Result<Vec<LotRecord>, FetchError>);

pub struct Session<M, P> {
    controller: ParkingController,
    presenter: PresentationAdapter<M, P>,
    source: Arc<dyn LotSource>,
    shutdown: CancellationToken,
}

impl<M: MapWidget, P: PanelRenderer> Session<M, P> {
    pub fn new(
        controller: ParkingController,
        presenter: PresentationAdapter<M, P>,
        source: Arc<dyn LotSource>,
    ) -> Self {
        Self {
            controller,
            presenter,
            source,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn controller(&self) -> &ParkingController {
        &self.controller
    }

    pub fn presenter(&self) -> &PresentationAdapter<M, P> {
        &self.presenter
    }

    /// Cancelling this token stops the loop and abandons in-flight fetches.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Run until shut down, or until the command channel closes and the
    /// latest fetch has settled. Returns the session for inspection.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) -> Self {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();
        let mut commands_open = true;

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::debug!("Session shutting down");
                    break;
                }
                command = commands.recv(), if commands_open => match command {
                    Some(command) => self.handle(command, &done_tx),
                    None => {
                        commands_open = false;
                        if !self.controller.is_refreshing() {
                            break;
                        }
                    }
                },
                Some((ticket, fetched)) = done_rx.recv() => {
                    self.complete(ticket, fetched);
                    if !commands_open && !self.controller.is_refreshing() {
                        break;
                    }
                }
            }
        }

        self.shutdown.cancel();
        self
    }

    fn handle(&mut self, command: Command, done_tx: &mpsc::UnboundedSender<Completion>) {
        match command {
            Command::SetFilter(filter) => self.spawn_fetch(filter, done_tx),
            Command::Refresh => match self.controller.requested_filter() {
                Some(filter) => self.spawn_fetch(filter, done_tx),
                None => tracing::debug!("Refresh requested before any filter was set"),
            },
            Command::Select(id) => {
                if let Some(update) = self.controller.select(&id) {
                    self.presenter.apply(&update);
                }
            }
            Command::Deselect => {
                let update = self.controller.deselect();
                self.presenter.apply(&update);
            }
        }
    }

    fn spawn_fetch(&mut self, filter: Filter, done_tx: &mpsc::UnboundedSender<Completion>) {
        let ticket = self.controller.begin_refresh(filter);
        let source = Arc::clone(&self.source);
        let cancel = self.shutdown.child_token();
        let done_tx = done_tx.clone();

        tokio::spawn(async move {
            let fetched = tokio::select! {
                _ = cancel.cancelled() => return,
                fetched = source.fetch(ticket.filter()) => fetched,
            };
            // The loop may already be gone; nothing to report to.
            let _ = done_tx.send((ticket, fetched));
        });
    }

    fn complete(&mut self, ticket: FetchTicket, fetched: Result<Vec<LotRecord>, FetchError>) {
        match self.controller.complete_refresh(ticket, fetched) {
            RefreshOutcome::Applied { update, .. } | RefreshOutcome::Failed { update, .. } => {
                self.presenter.apply(&update);
            }
            RefreshOutcome::Stale => {}
        }
    }
}

use std::sync::Arc;

use compute::{NormalizationMode, StatsSource};
use runtime::MetricsSnapshot;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, warn};

use crate::controller::{PanelDisplay, RefreshController, RefreshTicket, StatsOutcome, fetch_stats};

const EVENT_QUEUE_LEN: usize = 64;

/// Signals that drive a refresh.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    /// The view finished loading; refresh with the selected mode. Only the
    /// first one triggers a refresh.
    ViewReady,
    /// The user picked a different normalization mode.
    ModeChanged(NormalizationMode),
}

/// Published panel state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelSnapshot {
    pub selected_mode: NormalizationMode,
    pub display: PanelDisplay,
    pub metrics: MetricsSnapshot,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PanelClosed;

impl std::fmt::Display for PanelClosed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "panel task is no longer running")
    }
}

impl std::error::Error for PanelClosed {}

/// Sending side of a running panel task plus a view of what it displays.
#[derive(Debug, Clone)]
pub struct PanelHandle {
    events: mpsc::Sender<PanelEvent>,
    snapshot: watch::Receiver<PanelSnapshot>,
}

impl PanelHandle {
    pub async fn send(&self, event: PanelEvent) -> Result<(), PanelClosed> {
        self.events.send(event).await.map_err(|_| PanelClosed)
    }

    pub fn snapshot(&self) -> PanelSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PanelSnapshot> {
        self.snapshot.clone()
    }
}

fn snapshot_of<S: StatsSource + ?Sized>(controller: &RefreshController<S>) -> PanelSnapshot {
    PanelSnapshot {
        selected_mode: controller.mode(),
        display: controller.display().clone(),
        metrics: controller.metrics().snapshot(),
    }
}

/// Starts the panel loop on the current runtime.
///
/// The returned join handle yields the controller once every handle is
/// dropped and all in-flight refreshes have settled.
pub fn spawn<S>(controller: RefreshController<S>) -> (PanelHandle, JoinHandle<RefreshController<S>>)
where
    S: StatsSource + ?Sized + 'static,
{
    let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_LEN);
    let (snapshot_tx, snapshot_rx) = watch::channel(snapshot_of(&controller));
    let join = tokio::spawn(run(controller, events_rx, snapshot_tx));
    (
        PanelHandle {
            events: events_tx,
            snapshot: snapshot_rx,
        },
        join,
    )
}

/// Event loop owning the controller.
///
/// Each event issues a refresh whose fetch runs on its own task, so a slow
/// request never blocks newer ones. Completions come back here and go through
/// the controller's generation check before touching the display.
pub async fn run<S>(
    mut controller: RefreshController<S>,
    mut events: mpsc::Receiver<PanelEvent>,
    snapshot: watch::Sender<PanelSnapshot>,
) -> RefreshController<S>
where
    S: StatsSource + ?Sized + 'static,
{
    let mut in_flight: JoinSet<(RefreshTicket, StatsOutcome)> = JoinSet::new();
    let mut events_open = true;
    let mut view_ready = false;

    loop {
        tokio::select! {
            event = events.recv(), if events_open => {
                let Some(event) = event else {
                    debug!(in_flight = in_flight.len(), "panel events closed");
                    events_open = false;
                    continue;
                };
                match event {
                    PanelEvent::ViewReady if view_ready => {
                        debug!("view already ready, ignoring");
                        continue;
                    }
                    PanelEvent::ViewReady => view_ready = true,
                    PanelEvent::ModeChanged(mode) => controller.select_mode(mode),
                }
                let ticket = controller.begin();
                let source: Arc<S> = controller.source();
                in_flight.spawn(async move {
                    let outcome = fetch_stats(&*source, &ticket.params).await;
                    (ticket, outcome)
                });
            }
            Some(joined) = in_flight.join_next() => {
                match joined {
                    Ok((ticket, outcome)) => {
                        controller.complete(ticket, outcome);
                    }
                    Err(err) => {
                        controller.record_aborted();
                        error!(error = %err, "statistics refresh task failed");
                    }
                }
            }
            else => break,
        }

        controller.set_in_flight(in_flight.len());
        snapshot.send_replace(snapshot_of(&controller));
    }

    if snapshot.receiver_count() == 0 {
        warn!("panel stopped with no display subscribers");
    }
    controller
}

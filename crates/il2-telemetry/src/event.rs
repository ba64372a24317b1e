//! Telemetry update events and their consumers.

use il2_motion_protocol::TelemetrySnapshot;
use serde::Serialize;
use tracing::debug;

/// The snapshot just decoded, paired with the one emitted before it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetryUpdate {
    current: TelemetrySnapshot,
    previous: TelemetrySnapshot,
}

impl TelemetryUpdate {
    pub fn new(current: TelemetrySnapshot, previous: TelemetrySnapshot) -> Self {
        Self { current, previous }
    }

    pub fn current(&self) -> &TelemetrySnapshot {
        &self.current
    }

    /// Zeroed until the second frame of a run.
    pub fn previous(&self) -> &TelemetrySnapshot {
        &self.previous
    }

    /// `current - previous` for a named field.
    pub fn delta(&self, name: &str) -> Option<f64> {
        Some(self.current.value(name)? - self.previous.value(name)?)
    }
}

/// Carries the last emitted snapshot from one frame to the next.
#[derive(Debug, Clone, Default)]
pub struct SnapshotChain {
    previous: TelemetrySnapshot,
}

impl SnapshotChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous(&self) -> &TelemetrySnapshot {
        &self.previous
    }

    /// Pair `current` with the previous snapshot and make it the new previous.
    pub fn advance(&mut self, current: TelemetrySnapshot) -> TelemetryUpdate {
        let previous = std::mem::replace(&mut self.previous, current);
        TelemetryUpdate::new(current, previous)
    }
}

/// Receiver of telemetry updates.
///
/// Called synchronously on the listener thread once per valid frame. Slow
/// consumers stall ingestion; hand work off to another thread if needed.
pub trait TelemetryConsumer: Send + Sync + 'static {
    fn on_update(&self, update: &TelemetryUpdate);
}

impl<F> TelemetryConsumer for F
where
    F: Fn(&TelemetryUpdate) + Send + Sync + 'static,
{
    fn on_update(&self, update: &TelemetryUpdate) {
        self(update)
    }
}

impl TelemetryConsumer for crossbeam::channel::Sender<TelemetryUpdate> {
    fn on_update(&self, update: &TelemetryUpdate) {
        if let Err(e) = self.try_send(*update) {
            debug!(error = %e, "Dropping IL-2 telemetry update");
        }
    }
}

impl TelemetryConsumer for tokio::sync::mpsc::Sender<TelemetryUpdate> {
    fn on_update(&self, update: &TelemetryUpdate) {
        if let Err(e) = self.try_send(*update) {
            debug!(error = %e, "Dropping IL-2 telemetry update");
        }
    }
}

//! Connection and activity tracking.
//!
//! Two independent flags are derived from packet timing:
//! - `connected`: datagrams of any kind are reaching the socket
//! - `running`: the simulation is producing valid motion frames
//!
//! [`ConnectionStateMachine`] owns the policy and is pure apart from
//! logging. The polling loop feeds it observations together with the
//! current instant and publishes the result through [`ConnectionFlags`].

use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::info;

/// Point-in-time copy of the connection flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub running: bool,
}

/// Conceptual state implied by the two flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionPhase {
    Idle,
    Connected,
    Running,
}

impl ConnectionStatus {
    pub const IDLE: Self = Self {
        connected: false,
        running: false,
    };

    pub fn phase(&self) -> ConnectionPhase {
        if self.running {
            ConnectionPhase::Running
        } else if self.connected {
            ConnectionPhase::Connected
        } else {
            ConnectionPhase::Idle
        }
    }
}

/// What the polling loop should do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Keep polling.
    Continue,
    /// Pause for the idle backoff before polling again.
    Backoff,
    /// Publish a telemetry update for the frame just decoded.
    Emit,
}

const CONNECTED_BIT: u8 = 0b01;
const RUNNING_BIT: u8 = 0b10;

impl ConnectionStatus {
    fn to_bits(self) -> u8 {
        let mut bits = 0;
        if self.connected {
            bits |= CONNECTED_BIT;
        }
        if self.running {
            bits |= RUNNING_BIT;
        }
        bits
    }

    fn from_bits(bits: u8) -> Self {
        Self {
            connected: bits & CONNECTED_BIT != 0,
            running: bits & RUNNING_BIT != 0,
        }
    }
}

/// Connection flags shared between the worker and observers.
///
/// Both flags live in one atomic so readers always see a pair the state
/// machine actually produced.
#[derive(Debug, Default)]
pub struct ConnectionFlags {
    bits: AtomicU8,
}

impl ConnectionFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.status().connected
    }

    pub fn is_running(&self) -> bool {
        self.status().running
    }

    pub fn status(&self) -> ConnectionStatus {
        ConnectionStatus::from_bits(self.bits.load(Ordering::Acquire))
    }

    pub(crate) fn publish(&self, status: ConnectionStatus) {
        self.bits.store(status.to_bits(), Ordering::Release);
    }
}

/// Staleness-driven state machine for the two connection flags.
#[derive(Debug, Clone)]
pub struct ConnectionStateMachine {
    staleness_window: Duration,
    last_valid: Instant,
    status: ConnectionStatus,
}

impl ConnectionStateMachine {
    /// Start idle. The staleness timer runs from `started_at`.
    pub fn new(staleness_window: Duration, started_at: Instant) -> Self {
        Self {
            staleness_window,
            last_valid: started_at,
            status: ConnectionStatus::IDLE,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Time since the last valid frame, or since start if none arrived yet.
    pub fn elapsed_since_valid(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_valid)
    }

    fn is_stale(&self, now: Instant) -> bool {
        self.elapsed_since_valid(now) > self.staleness_window
    }

    /// No datagram was waiting on the socket.
    pub fn on_idle(&mut self, now: Instant) -> Action {
        if !self.is_stale(now) {
            return Action::Continue;
        }
        self.transition(ConnectionStatus::IDLE, "no valid frame within staleness window");
        Action::Backoff
    }

    /// A datagram of any shape arrived.
    pub fn on_datagram(&mut self) {
        self.transition(
            ConnectionStatus {
                connected: true,
                ..self.status
            },
            "datagram received",
        );
    }

    /// A correctly sized frame with the motion-device identifier was decoded.
    pub fn on_valid_frame(&mut self, now: Instant) -> Action {
        self.last_valid = now;
        self.transition(
            ConnectionStatus {
                connected: true,
                running: true,
            },
            "valid motion frame",
        );
        Action::Emit
    }

    /// A correctly sized frame carried a foreign identifier.
    ///
    /// `running` is left alone until the staleness window has also expired,
    /// so a stray packet between valid frames does not flap the flag.
    pub fn on_unexpected_identifier(&mut self, now: Instant) -> Action {
        self.demote_if_stale(now, "foreign packet identifier past staleness window");
        Action::Continue
    }

    /// The datagram had the wrong length.
    ///
    /// Like a foreign identifier, this clears `running` once the staleness
    /// window has expired, so a stream of malformed datagrams cannot keep a
    /// stale `running` flag alive.
    pub fn on_size_mismatch(&mut self, now: Instant) -> Action {
        self.demote_if_stale(now, "malformed datagram past staleness window");
        Action::Continue
    }

    /// Receiving failed.
    pub fn on_error(&mut self) -> Action {
        self.transition(ConnectionStatus::IDLE, "receive error");
        Action::Backoff
    }

    /// The loop is shutting down.
    pub fn on_stop(&mut self) {
        self.transition(ConnectionStatus::IDLE, "listener stopped");
    }

    fn demote_if_stale(&mut self, now: Instant, reason: &str) {
        if self.is_stale(now) {
            self.transition(
                ConnectionStatus {
                    running: false,
                    ..self.status
                },
                reason,
            );
        }
    }

    fn transition(&mut self, next: ConnectionStatus, reason: &str) {
        if self.status == next {
            return;
        }
        let previous = self.status;
        self.status = next;
        info!(
            from = ?previous.phase(),
            to = ?next.phase(),
            connected = next.connected,
            running = next.running,
            reason,
            "IL-2 telemetry state changed"
        );
    }
}

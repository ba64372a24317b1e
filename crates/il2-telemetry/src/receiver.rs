//! The polling loop run by the listener thread.

use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam::channel::Receiver;
use il2_motion_protocol::{DecodeError, TelemetrySnapshot, decode_frame};
use parking_lot::Mutex;
use tracing::{debug, error, info};

use crate::clock::Clock;
use crate::config::ListenerConfig;
use crate::event::{SnapshotChain, TelemetryConsumer};
use crate::socket;
use crate::state::{Action, ConnectionFlags, ConnectionStateMachine};
use crate::stats::ListenerStats;

/// State visible to both the worker and the owning provider.
#[derive(Debug, Default)]
pub(crate) struct ListenerShared {
    pub(crate) flags: ConnectionFlags,
    pub(crate) stats: ListenerStats,
    pub(crate) latest: Mutex<Option<TelemetrySnapshot>>,
    stop: AtomicBool,
}

impl ListenerShared {
    pub(crate) fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    pub(crate) fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Prepare for a new run.
    pub(crate) fn rearm(&self) {
        self.stop.store(false, Ordering::Release);
        *self.latest.lock() = None;
    }
}

/// Everything the worker thread owns for one run.
pub(crate) struct PollingLoop {
    socket: UdpSocket,
    config: ListenerConfig,
    clock: Arc<dyn Clock>,
    consumer: Arc<dyn TelemetryConsumer>,
    shared: Arc<ListenerShared>,
    wake: Receiver<()>,
    machine: ConnectionStateMachine,
    chain: SnapshotChain,
    buf: Vec<u8>,
}

impl PollingLoop {
    /// `wake` interrupts the idle backoff when its sender is dropped.
    pub(crate) fn new(
        socket: UdpSocket,
        config: ListenerConfig,
        clock: Arc<dyn Clock>,
        consumer: Arc<dyn TelemetryConsumer>,
        shared: Arc<ListenerShared>,
        wake: Receiver<()>,
    ) -> Self {
        let machine = ConnectionStateMachine::new(config.staleness_window(), clock.now());
        let buf = vec![0u8; config.recv_buffer_size];
        Self {
            socket,
            config,
            clock,
            consumer,
            shared,
            wake,
            machine,
            chain: SnapshotChain::new(),
            buf,
        }
    }

    pub(crate) fn run(mut self) {
        let local_addr = self.socket.local_addr().ok();
        info!(local_addr = ?local_addr, "IL-2 telemetry listener started");
        self.publish();

        while !self.shared.stop_requested() {
            if self.step() == Action::Backoff {
                self.backoff();
            }
        }

        self.machine.on_stop();
        self.publish();
        let stats = self.shared.stats.snapshot();
        info!(
            datagrams = stats.datagrams_received,
            frames = stats.frames_emitted,
            "IL-2 telemetry listener stopped"
        );
    }

    /// One loop iteration: wait for a datagram and apply the resulting transition.
    pub(crate) fn step(&mut self) -> Action {
        let action = match socket::poll_datagram(&self.socket, &mut self.buf) {
            Ok(None) => self.machine.on_idle(self.clock.now()),
            Ok(Some((len, from))) => {
                self.shared.stats.inc_datagram();
                self.machine.on_datagram();
                self.handle_datagram(len, from)
            }
            Err(e) => {
                error!(error = %e, "IL-2 telemetry exception while receiving data");
                self.shared.stats.inc_receive_error();
                self.machine.on_error()
            }
        };
        self.publish();
        action
    }

    fn handle_datagram(&mut self, len: usize, from: Option<SocketAddr>) -> Action {
        debug!(from = ?from, len, "IL-2 datagram");
        let payload = self.buf.get(..len).unwrap_or_default();

        match decode_frame(payload) {
            Ok(raw) => {
                let action = self.machine.on_valid_frame(self.clock.now());
                if action == Action::Emit {
                    let snapshot = TelemetrySnapshot::normalize(&raw, self.config.roll_threshold_deg);
                    self.emit(snapshot);
                }
                action
            }
            Err(DecodeError::UnexpectedIdentifier { found }) => {
                debug!(
                    from = ?from,
                    packet_id = %format_args!("{found:#010X}"),
                    "Ignoring non-motion packet"
                );
                self.shared.stats.inc_unexpected_identifier();
                self.machine.on_unexpected_identifier(self.clock.now())
            }
            Err(e @ DecodeError::SizeMismatch { .. }) => {
                debug!(from = ?from, error = %e, "Ignoring malformed IL-2 packet");
                self.shared.stats.inc_size_mismatch();
                self.machine.on_size_mismatch(self.clock.now())
            }
        }
    }

    fn emit(&mut self, snapshot: TelemetrySnapshot) {
        // Observers polling the flags must see `running` before the update lands.
        self.publish();
        let update = self.chain.advance(snapshot);
        *self.shared.latest.lock() = Some(snapshot);
        self.consumer.on_update(&update);
        self.shared.stats.inc_frame();
    }

    fn backoff(&mut self) {
        self.shared.stats.inc_backoff();
        debug!(
            backoff_ms = self.config.idle_backoff_ms,
            "IL-2 telemetry idle, backing off"
        );
        // Returns early once the provider drops the sender on stop.
        let _ = self.wake.recv_timeout(self.config.idle_backoff());
    }

    fn publish(&self) {
        self.shared.flags.publish(self.machine.status());
    }
}

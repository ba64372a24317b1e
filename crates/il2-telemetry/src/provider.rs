//! Host-facing provider lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Sender};
use il2_motion_protocol::{FIELD_NAMES, TelemetrySnapshot};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::clock::{Clock, SystemClock};
use crate::config::ListenerConfig;
use crate::error::ListenerError;
use crate::event::{TelemetryConsumer, TelemetryUpdate};
use crate::receiver::{ListenerShared, PollingLoop};
use crate::socket;
use crate::state::ConnectionStatus;
use crate::stats::StatsSnapshot;

/// Name under which hosts discover this provider.
pub const PROVIDER_NAME: &str = "il2";

/// Lifecycle contract expected by the hosting application.
pub trait TelemetryProvider: Send {
    /// Identifier used for discovery and profile linking.
    fn name(&self) -> &str;

    /// Start listening. A no-op when already started.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid, the socket cannot be bound or
    /// the worker thread cannot be spawned.
    fn start(&mut self) -> Result<(), ListenerError>;

    /// Stop listening and wait for the worker to exit. Safe to call at any time.
    fn stop(&mut self);

    /// Names of all telemetry values this provider produces.
    fn value_list(&self) -> &'static [&'static str];

    fn is_connected(&self) -> bool;

    fn is_running(&self) -> bool;
}

/// Static provider metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProviderInfo {
    pub name: &'static str,
    pub author: &'static str,
    pub version: &'static str,
}

struct Worker {
    thread: JoinHandle<()>,
    // Dropping this wakes the worker out of its idle backoff.
    wake: Sender<()>,
    local_addr: SocketAddr,
}

/// UDP telemetry provider for IL-2 Sturmovik.
///
/// Owns at most one listener thread. Updates go to the consumer given at
/// construction; connection flags, the latest snapshot and counters can be
/// read from any thread.
pub struct Il2TelemetryProvider {
    config: ListenerConfig,
    clock: Arc<dyn Clock>,
    consumer: Arc<dyn TelemetryConsumer>,
    shared: Arc<ListenerShared>,
    worker: Option<Worker>,
}

impl Il2TelemetryProvider {
    pub fn new(config: ListenerConfig, consumer: impl TelemetryConsumer) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            consumer: Arc::new(consumer),
            shared: Arc::new(ListenerShared::default()),
            worker: None,
        }
    }

    /// Like [`Il2TelemetryProvider::new`] with a closure consumer.
    pub fn with_callback<F>(config: ListenerConfig, callback: F) -> Self
    where
        F: Fn(&TelemetryUpdate) + Send + Sync + 'static,
    {
        Self::new(config, callback)
    }

    /// Replace the time source. Takes effect on the next start.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn info() -> ProviderInfo {
        ProviderInfo {
            name: PROVIDER_NAME,
            author: env!("CARGO_PKG_AUTHORS"),
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }

    pub fn is_started(&self) -> bool {
        self.worker.is_some()
    }

    /// Address the socket is bound to while started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.worker.as_ref().map(|w| w.local_addr)
    }

    pub fn status(&self) -> ConnectionStatus {
        self.shared.flags.status()
    }

    /// Most recent snapshot handed to the consumer during the current run.
    pub fn latest_snapshot(&self) -> Option<TelemetrySnapshot> {
        *self.shared.latest.lock()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    fn spawn(&mut self) -> Result<(), ListenerError> {
        self.config.validate()?;
        let socket = socket::bind(&self.config)?;
        let local_addr = socket.local_addr().map_err(|source| ListenerError::Bind {
            addr: self.config.socket_addr(),
            source,
        })?;

        let (wake, wake_rx) = channel::bounded(1);
        self.shared.rearm();
        let polling = PollingLoop::new(
            socket,
            self.config.clone(),
            Arc::clone(&self.clock),
            Arc::clone(&self.consumer),
            Arc::clone(&self.shared),
            wake_rx,
        );

        let thread = thread::Builder::new()
            .name(format!("{PROVIDER_NAME}-telemetry"))
            .spawn(move || polling.run())
            .map_err(ListenerError::Spawn)?;

        self.worker = Some(Worker {
            thread,
            wake,
            local_addr,
        });
        info!(%local_addr, "IL-2 telemetry provider started");
        Ok(())
    }
}

impl TelemetryProvider for Il2TelemetryProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn start(&mut self) -> Result<(), ListenerError> {
        if let Some(worker) = &self.worker {
            if !worker.thread.is_finished() {
                debug!("IL-2 telemetry already started");
                return Ok(());
            }
            // The worker died on its own; reap it before starting over.
            self.stop();
        }
        debug!(port = self.config.port, "Starting IL-2 telemetry");
        self.spawn()
    }

    fn stop(&mut self) {
        debug!("Stopping IL-2 telemetry");
        if let Some(worker) = self.worker.take() {
            self.shared.request_stop();
            drop(worker.wake);
            if worker.thread.join().is_err() {
                error!("IL-2 telemetry worker thread panicked");
            }
            info!("IL-2 telemetry provider stopped");
        }
        self.shared.flags.publish(ConnectionStatus::IDLE);
    }

    fn value_list(&self) -> &'static [&'static str] {
        &FIELD_NAMES
    }

    fn is_connected(&self) -> bool {
        self.shared.flags.is_connected()
    }

    fn is_running(&self) -> bool {
        self.shared.flags.is_running()
    }
}

impl Drop for Il2TelemetryProvider {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.stop();
        }
    }
}

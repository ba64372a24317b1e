//! Listener configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use il2_motion_protocol::{DEFAULT_ROLL_THRESHOLD_DEG, RECORD_SIZE};
use serde::{Deserialize, Serialize};

use crate::error::ListenerError;

/// Default UDP port of the IL-2 motion-device output.
pub const DEFAULT_PORT: u16 = 4321;
/// Time without a valid frame after which the simulation is considered stopped.
pub const DEFAULT_STALENESS_WINDOW_MS: u64 = 500;
/// Pause taken while fully disconnected.
pub const DEFAULT_IDLE_BACKOFF_MS: u64 = 1000;
/// Upper bound on a single wait for a datagram.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;
/// Receive buffer length; larger than any record so oversize datagrams are detected.
pub const DEFAULT_RECV_BUFFER_SIZE: usize = 2048;

/// Configuration of the telemetry listener.
///
/// Durations are stored as integer milliseconds so the struct maps directly
/// onto host configuration files; use the accessor methods to get
/// [`Duration`] values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Local address to bind.
    pub bind_address: IpAddr,
    /// Local UDP port. `0` selects an ephemeral port.
    pub port: u16,
    /// Allow other listeners to bind the same port.
    pub reuse_address: bool,
    pub staleness_window_ms: u64,
    pub idle_backoff_ms: u64,
    pub poll_interval_ms: u64,
    /// Roll magnitude in degrees past which roll is reflected.
    pub roll_threshold_deg: f32,
    pub recv_buffer_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            reuse_address: true,
            staleness_window_ms: DEFAULT_STALENESS_WINDOW_MS,
            idle_backoff_ms: DEFAULT_IDLE_BACKOFF_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            roll_threshold_deg: DEFAULT_ROLL_THRESHOLD_DEG,
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
        }
    }
}

impl ListenerConfig {
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_bind_address(mut self, address: IpAddr) -> Self {
        self.bind_address = address;
        self
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    pub fn staleness_window(&self) -> Duration {
        Duration::from_millis(self.staleness_window_ms)
    }

    pub fn idle_backoff(&self) -> Duration {
        Duration::from_millis(self.idle_backoff_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Check the configuration before a listener is started.
    pub fn validate(&self) -> Result<(), ListenerError> {
        if self.poll_interval_ms == 0 {
            return Err(ListenerError::invalid_config(
                "poll_interval_ms",
                "must be greater than zero",
            ));
        }
        if self.staleness_window_ms == 0 {
            return Err(ListenerError::invalid_config(
                "staleness_window_ms",
                "must be greater than zero",
            ));
        }
        if !self.roll_threshold_deg.is_finite()
            || self.roll_threshold_deg <= 0.0
            || self.roll_threshold_deg > 180.0
        {
            return Err(ListenerError::invalid_config(
                "roll_threshold_deg",
                format!("must be in (0, 180], got {}", self.roll_threshold_deg),
            ));
        }
        if self.recv_buffer_size <= RECORD_SIZE {
            return Err(ListenerError::invalid_config(
                "recv_buffer_size",
                format!("must exceed the {RECORD_SIZE}-byte record"),
            ));
        }
        Ok(())
    }
}

//! Real-time UDP listener for IL-2 Sturmovik motion telemetry.
//!
//! [`Il2TelemetryProvider`] binds a UDP socket (default port 4321), runs a
//! dedicated listener thread and hands every valid motion frame to a
//! [`TelemetryConsumer`] as a [`TelemetryUpdate`] (current and previous
//! [`TelemetrySnapshot`]). Two flags describe the link:
//!
//! - `connected`: datagrams are reaching the socket
//! - `running`: valid frames arrived within the staleness window (500 ms)
//!
//! After the staleness window passes with no traffic both flags drop and the
//! listener backs off for a second between polls.
//!
//! # Usage
//!
//! ```rust,no_run
//! use il2_telemetry::{Il2TelemetryProvider, ListenerConfig, TelemetryProvider, TelemetryUpdate};
//!
//! # fn main() -> Result<(), il2_telemetry::ListenerError> {
//! let (tx, rx) = crossbeam::channel::bounded::<TelemetryUpdate>(64);
//! let mut provider = Il2TelemetryProvider::new(ListenerConfig::default(), tx);
//! provider.start()?;
//!
//! while let Ok(update) = rx.recv() {
//!     println!("roll {:.1} pitch {:.1}", update.current().roll(), update.current().pitch());
//! }
//! provider.stop();
//! # Ok(())
//! # }
//! ```

#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]

pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod provider;
mod receiver;
mod socket;
pub mod state;
pub mod stats;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ListenerConfig;
pub use error::ListenerError;
pub use event::{SnapshotChain, TelemetryConsumer, TelemetryUpdate};
pub use provider::{Il2TelemetryProvider, PROVIDER_NAME, ProviderInfo, TelemetryProvider};
pub use state::{
    Action, ConnectionFlags, ConnectionPhase, ConnectionStateMachine, ConnectionStatus,
};
pub use stats::{ListenerStats, StatsSnapshot};

pub use il2_motion_protocol::{
    DecodeError, FIELD_NAMES, RawTelemetryRecord, TelemetrySnapshot,
};

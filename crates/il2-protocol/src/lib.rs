//! IL-2 Sturmovik motion-device telemetry protocol.
//!
//! IL-2 Great Battles can broadcast aircraft motion over UDP (the
//! `motiondevice` block of `startup.cfg`, default port 4321). Every datagram
//! is a single packed 44-byte little-endian record; see [`layout`] for the
//! exact offsets.
//!
//! This crate is I/O-free. It provides:
//! - [`RawTelemetryRecord::decode`] / [`decode_frame`]: strict fixed-size decode
//! - [`normalize_roll`] / [`radians_to_degrees`]: orientation conversion
//! - [`TelemetrySnapshot`]: the normalized record handed to consumers
//! - [`FIELD_NAMES`]: the field list shown in host configuration UIs
//!
//! ```rust
//! use il2_motion_protocol::{decode_frame, RawTelemetryRecord, TelemetrySnapshot, PACKET_ID};
//!
//! let wire = RawTelemetryRecord { packet_id: PACKET_ID, roll: 2.356_194_5, ..Default::default() }.encode();
//! let raw = decode_frame(&wire)?;
//! let snapshot = TelemetrySnapshot::normalize(&raw, 90.0);
//! assert!((snapshot.roll() - 45.0).abs() < 1e-3);
//! # Ok::<(), il2_motion_protocol::DecodeError>(())
//! ```

#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]

pub mod angle;
pub mod error;
pub mod layout;
pub mod record;
pub mod snapshot;

pub use angle::{DEFAULT_ROLL_THRESHOLD_DEG, normalize_roll, radians_to_degrees};
pub use error::DecodeError;
pub use layout::{
    FIELD_COUNT, FIELD_NAMES, FIELDS, FieldKind, FieldSpec, LAYOUT_VERSION, PACKET_ID,
    RECORD_SIZE, field_spec,
};
pub use record::{RawTelemetryRecord, decode_frame};
pub use snapshot::TelemetrySnapshot;

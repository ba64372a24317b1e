//! Decode errors.

use crate::layout::{PACKET_ID, RECORD_SIZE};

/// Reasons a datagram is not accepted as a telemetry frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Payload length differs from the fixed record size.
    #[error("payload size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Payload is the right size but does not carry the motion-device identifier.
    #[error(
        "unexpected packet identifier {found:#010X}, expected {expected:#010X}",
        expected = PACKET_ID
    )]
    UnexpectedIdentifier { found: u32 },
}

impl DecodeError {
    pub(crate) fn size_mismatch(actual: usize) -> Self {
        DecodeError::SizeMismatch {
            expected: RECORD_SIZE,
            actual,
        }
    }
}

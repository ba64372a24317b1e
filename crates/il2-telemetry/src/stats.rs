//! Lock-free listener counters.
//!
//! Incremented from the worker thread with `Ordering::Relaxed`; readers get
//! an eventually consistent [`StatsSnapshot`].

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatsSnapshot {
    /// Datagrams of any shape read from the socket.
    pub datagrams_received: u64,
    /// Valid frames delivered to the consumer.
    pub frames_emitted: u64,
    /// Datagrams dropped for having the wrong length.
    pub size_mismatches: u64,
    /// Correctly sized datagrams with a foreign identifier.
    pub unexpected_identifiers: u64,
    /// Socket receive failures.
    pub receive_errors: u64,
    /// Idle backoff pauses taken.
    pub backoffs: u64,
}

#[derive(Debug, Default)]
pub struct ListenerStats {
    datagrams_received: AtomicU64,
    frames_emitted: AtomicU64,
    size_mismatches: AtomicU64,
    unexpected_identifiers: AtomicU64,
    receive_errors: AtomicU64,
    backoffs: AtomicU64,
}

impl ListenerStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn inc_datagram(&self) {
        self.datagrams_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_frame(&self) {
        self.frames_emitted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_size_mismatch(&self) {
        self.size_mismatches.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_unexpected_identifier(&self) {
        self.unexpected_identifiers.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_receive_error(&self) {
        self.receive_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_backoff(&self) {
        self.backoffs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            datagrams_received: self.datagrams_received.load(Ordering::Relaxed),
            frames_emitted: self.frames_emitted.load(Ordering::Relaxed),
            size_mismatches: self.size_mismatches.load(Ordering::Relaxed),
            unexpected_identifiers: self.unexpected_identifiers.load(Ordering::Relaxed),
            receive_errors: self.receive_errors.load(Ordering::Relaxed),
            backoffs: self.backoffs.load(Ordering::Relaxed),
        }
    }
}

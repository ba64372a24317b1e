//! Listener errors.
//!
//! Only startup can fail. Once the worker runs, receive and decode problems
//! are logged and folded into the connection flags instead of surfacing here.

use std::net::SocketAddr;

#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("failed to bind UDP socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn telemetry worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("invalid listener configuration `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

impl ListenerError {
    pub(crate) fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        ListenerError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

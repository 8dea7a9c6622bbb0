use crate::peer::PeerState;
use meshcall_core::{SignalKind, SignalParseError};
use thiserror::Error;

/// Capture failures. The mesh degrades to "no local media" on any of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("capture permission denied")]
    PermissionDenied,

    #[error("no capture device available")]
    NoDevice,

    #[error("local media session already released")]
    Released,

    #[error("capture device error: {0}")]
    Device(String),
}

/// Failure of a single link. Closes that link only.
#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error(transparent)]
    Transport(#[from] anyhow::Error),

    #[error("unexpected {signal} while {state}")]
    UnexpectedSignal { state: PeerState, signal: SignalKind },

    #[error("peer connection failed")]
    ConnectionFailed,
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("relay connection closed")]
    Closed,

    #[error("failed to encode relay message: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum MeshError {
    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    SignalParse(#[from] SignalParseError),

    #[error(transparent)]
    Negotiation(#[from] NegotiationError),

    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error("mesh coordinator is no longer running")]
    Stopped,
}

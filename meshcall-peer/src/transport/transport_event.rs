use crate::render::RemoteMedia;
use meshcall_core::{IceCandidate, ParticipantId};
use std::fmt;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;

/// Identifies one incarnation of a link. A link recreated for the same
/// remote gets a new epoch, so events from its predecessor are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkKey {
    pub remote_id: ParticipantId,
    pub epoch: u64,
}

impl LinkKey {
    pub fn new(remote_id: ParticipantId, epoch: u64) -> Self {
        Self { remote_id, epoch }
    }
}

impl fmt::Display for LinkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.remote_id, self.epoch)
    }
}

/// Native connection state, as reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

impl From<RTCPeerConnectionState> for ConnectionState {
    fn from(state: RTCPeerConnectionState) -> Self {
        match state {
            RTCPeerConnectionState::Connecting => ConnectionState::Connecting,
            RTCPeerConnectionState::Connected => ConnectionState::Connected,
            RTCPeerConnectionState::Disconnected => ConnectionState::Disconnected,
            RTCPeerConnectionState::Failed => ConnectionState::Failed,
            RTCPeerConnectionState::Closed => ConnectionState::Closed,
            _ => ConnectionState::New,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::New => "new",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Failed => "failed",
            ConnectionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Raised by transport callbacks and consumed by the coordinator loop.
#[derive(Debug)]
pub enum TransportEvent {
    CandidateGenerated(LinkKey, IceCandidate),
    TrackReceived(LinkKey, RemoteMedia),
    StateChanged(LinkKey, ConnectionState),
}

impl TransportEvent {
    pub fn key(&self) -> &LinkKey {
        match self {
            TransportEvent::CandidateGenerated(key, _)
            | TransportEvent::TrackReceived(key, _)
            | TransportEvent::StateChanged(key, _) => key,
        }
    }
}

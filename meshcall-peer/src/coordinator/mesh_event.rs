use crate::error::MediaError;
use crate::peer::PeerState;
use crate::transport::ConnectionState;
use meshcall_core::ParticipantId;

/// Observability stream of a running mesh.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshEvent {
    LinkState {
        remote_id: ParticipantId,
        state: PeerState,
    },
    ConnectionState {
        remote_id: ParticipantId,
        state: ConnectionState,
    },
    NegotiationFailed {
        remote_id: ParticipantId,
        reason: String,
    },
    CameraUnavailable {
        reason: MediaError,
    },
    RelayDisconnected,
}

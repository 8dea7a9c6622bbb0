mod media;
mod participant;
mod relay;
mod roster;
mod signaling;

pub use media::{AudioConstraints, AudioSettings, MediaConstraints, MediaKind, VideoConstraints};
pub use participant::{Participant, ParticipantId, Role};
pub use relay::{RelayMessage, RelayRequest, SignalParseError};
pub use roster::Roster;
pub use signaling::{IceCandidate, IceServerConfig, Signal, SignalEnvelope, SignalKind};

use std::fmt;

/// Negotiation progress of one link.
///
/// Initiator: `Idle -> Offering -> AwaitingAnswer -> Connected`.
/// Responder: `Idle -> AwaitingOffer -> Answering -> Connected`.
/// Any state may move to `Closed`, which is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PeerState {
    #[default]
    Idle,
    Offering,
    AwaitingAnswer,
    AwaitingOffer,
    Answering,
    Connected,
    Closed,
}

impl PeerState {
    pub fn is_closed(&self) -> bool {
        matches!(self, PeerState::Closed)
    }
}

impl fmt::Display for PeerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PeerState::Idle => "idle",
            PeerState::Offering => "offering",
            PeerState::AwaitingAnswer => "awaiting-answer",
            PeerState::AwaitingOffer => "awaiting-offer",
            PeerState::Answering => "answering",
            PeerState::Connected => "connected",
            PeerState::Closed => "closed",
        };
        f.write_str(name)
    }
}

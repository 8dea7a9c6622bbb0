use meshcall_core::ParticipantId;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkRole {
    Initiator,
    Responder,
}

impl LinkRole {
    /// Glare-free role of `local` toward `remote`: the strictly greater id
    /// sends the offer. Both sides compute this without talking.
    pub fn for_pair(local: &ParticipantId, remote: &ParticipantId) -> Self {
        if local > remote {
            LinkRole::Initiator
        } else {
            LinkRole::Responder
        }
    }
}

impl fmt::Display for LinkRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkRole::Initiator => f.write_str("initiator"),
            LinkRole::Responder => f.write_str("responder"),
        }
    }
}

use crate::model::participant::ParticipantId;
use crate::model::roster::Roster;
use crate::model::signaling::{Signal, SignalEnvelope};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignalParseError {
    #[error("malformed relay message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Messages pushed by the relay. Only `PlayersUpdate` and `Signal` feed the
/// mesh; the rest belong to lobby management.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum RelayMessage {
    PlayersUpdate {
        players: Roster,
        #[serde(default)]
        ready_count: usize,
    },
    Signal {
        from_id: ParticipantId,
        signal: Signal,
    },
    JoinedAsHost {
        id: ParticipantId,
    },
    JoinedAsPlayer {
        id: ParticipantId,
    },
    GameStarted,
    HostLeft,
    Error {
        message: String,
    },
    #[serde(other)]
    Unknown,
}

impl RelayMessage {
    pub fn parse(text: &str) -> Result<Self, SignalParseError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Messages sent to the relay.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum RelayRequest {
    Join { name: String },
    SetReady { ready: bool },
    Signal { target_id: ParticipantId, signal: Signal },
}

impl RelayRequest {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<SignalEnvelope> for RelayRequest {
    fn from(envelope: SignalEnvelope) -> Self {
        RelayRequest::Signal {
            target_id: envelope.target,
            signal: envelope.signal,
        }
    }
}

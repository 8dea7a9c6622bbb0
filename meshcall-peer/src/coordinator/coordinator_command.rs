use meshcall_core::{MediaKind, ParticipantId, Roster, Signal};
use tokio::sync::oneshot;

/// Input of the coordinator loop.
#[derive(Debug)]
pub enum CoordinatorCommand {
    /// A full roster snapshot.
    RosterUpdate(Roster),

    /// Raw text from the relay; parsed by the coordinator.
    RelayText(String),

    /// An already-parsed signal from `from`.
    Signal { from: ParticipantId, signal: Signal },

    /// The relay connection is gone.
    RelayClosed,

    SetMediaEnabled { kind: MediaKind, enabled: bool },

    /// Closes every link and releases capture; `done` fires afterwards.
    Teardown { done: oneshot::Sender<()> },
}

impl CoordinatorCommand {
    /// Commands held back until local media has settled, so the first
    /// links are built with the tracks they should carry.
    pub fn waits_for_media(&self) -> bool {
        !matches!(self, CoordinatorCommand::Teardown { .. })
    }
}

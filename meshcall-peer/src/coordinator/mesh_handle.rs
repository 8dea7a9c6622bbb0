use crate::config::MeshConfig;
use crate::coordinator::coordinator_command::CoordinatorCommand;
use crate::coordinator::mesh_coordinator::{MeshCoordinator, MeshParts};
use crate::coordinator::mesh_event::MeshEvent;
use crate::coordinator::mesh_view::MeshView;
use crate::error::MeshError;
use meshcall_core::{MediaKind, ParticipantId, Roster, Signal};
use tokio::sync::{mpsc, oneshot};
use tracing::info;

const COMMAND_BUFFER: usize = 100;

/// Cloneable front of a spawned coordinator.
#[derive(Clone)]
pub struct MeshHandle {
    commands: mpsc::Sender<CoordinatorCommand>,
    view: MeshView,
}

impl MeshHandle {
    /// Spawns the coordinator loop. Local media acquisition starts at once.
    pub fn spawn(
        local_id: ParticipantId,
        config: MeshConfig,
        parts: MeshParts,
    ) -> (Self, mpsc::UnboundedReceiver<MeshEvent>) {
        let (commands, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        info!("Spawning mesh for {}", local_id);
        let coordinator = MeshCoordinator::new(local_id, config, parts, command_rx, events_tx);
        let view = coordinator.view();
        tokio::spawn(coordinator.run());

        (Self { commands, view }, events_rx)
    }

    pub fn view(&self) -> &MeshView {
        &self.view
    }

    pub async fn roster_update(&self, roster: Roster) -> Result<(), MeshError> {
        self.send(CoordinatorCommand::RosterUpdate(roster)).await
    }

    pub async fn relay_text(&self, text: impl Into<String>) -> Result<(), MeshError> {
        self.send(CoordinatorCommand::RelayText(text.into())).await
    }

    pub async fn signal(&self, from: ParticipantId, signal: Signal) -> Result<(), MeshError> {
        self.send(CoordinatorCommand::Signal { from, signal }).await
    }

    pub async fn relay_closed(&self) -> Result<(), MeshError> {
        self.send(CoordinatorCommand::RelayClosed).await
    }

    pub async fn set_media_enabled(&self, kind: MediaKind, enabled: bool) -> Result<(), MeshError> {
        self.send(CoordinatorCommand::SetMediaEnabled { kind, enabled })
            .await
    }

    /// Waits until every link is closed and capture is released. Calling it
    /// again, or after the loop has exited, is a no-op.
    pub async fn teardown(&self) -> Result<(), MeshError> {
        let (done, finished) = oneshot::channel();
        if self
            .commands
            .send(CoordinatorCommand::Teardown { done })
            .await
            .is_err()
        {
            return Ok(());
        }
        let _ = finished.await;
        Ok(())
    }

    async fn send(&self, cmd: CoordinatorCommand) -> Result<(), MeshError> {
        self.commands.send(cmd).await.map_err(|_| MeshError::Stopped)
    }
}

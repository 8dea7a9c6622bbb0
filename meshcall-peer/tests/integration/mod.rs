
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use meshcall_core::{Participant, ParticipantId, Role, Roster};
use meshcall_peer::{
    CoordinatorCommand, MeshConfig, MeshCoordinator, MeshEvent, MeshHandle, MeshParts,
};
use tokio::sync::mpsc;
use tracing::Level;

use crate::utils::{FakeConnector, RecordingRelay, RecordingSink, ScriptedDevices};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Roster of `(id, role)` entries.
pub fn roster(entries: &[(&str, Role)]) -> Roster {
    Roster::new(
        entries
            .iter()
            .map(|(id, role)| match role {
                Role::Host => Participant::host(*id, format!("host-{id}")),
                Role::Player => Participant::player(*id, format!("player-{id}")),
            })
            .collect(),
    )
}

pub fn players(ids: &[&str]) -> Roster {
    let entries: Vec<_> = ids.iter().map(|id| (*id, Role::Player)).collect();
    roster(&entries)
}

pub fn id_set(ids: &[&str]) -> BTreeSet<ParticipantId> {
    ids.iter().map(|id| ParticipantId::from(*id)).collect()
}

pub fn drain_events(events: &mut mpsc::UnboundedReceiver<MeshEvent>) -> Vec<MeshEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

/// A coordinator driven directly by the test, wired to mocks.
pub struct TestMesh {
    pub coordinator: MeshCoordinator,
    pub relay: RecordingRelay,
    pub sink: RecordingSink,
    pub connector: FakeConnector,
    pub devices: ScriptedDevices,
    pub events: mpsc::UnboundedReceiver<MeshEvent>,
    _commands: mpsc::Sender<CoordinatorCommand>,
}

pub fn test_mesh(local_id: &str, config: MeshConfig, devices: ScriptedDevices) -> TestMesh {
    let (relay, _signals) = RecordingRelay::new();
    let sink = RecordingSink::new();
    let connector = FakeConnector::new();
    let (commands, command_rx) = mpsc::channel(100);
    let (events_tx, events) = mpsc::unbounded_channel();

    let parts = MeshParts {
        devices: Arc::new(devices.clone()),
        connector: Arc::new(connector.clone()),
        relay: Arc::new(relay.clone()),
        render: Arc::new(sink.clone()),
    };
    let coordinator = MeshCoordinator::new(local_id.into(), config, parts, command_rx, events_tx);

    TestMesh {
        coordinator,
        relay,
        sink,
        connector,
        devices,
        events,
        _commands: commands,
    }
}

/// A coordinator running on its own task, wired to mocks.
pub struct SpawnedMesh {
    pub handle: MeshHandle,
    pub relay: RecordingRelay,
    pub sink: RecordingSink,
    pub connector: FakeConnector,
    pub devices: ScriptedDevices,
    pub events: mpsc::UnboundedReceiver<MeshEvent>,
}

pub fn spawn_mesh(local_id: &str, config: MeshConfig, devices: ScriptedDevices) -> SpawnedMesh {
    let (relay, _signals) = RecordingRelay::new();
    let sink = RecordingSink::new();
    let connector = FakeConnector::new();

    let parts = MeshParts {
        devices: Arc::new(devices.clone()),
        connector: Arc::new(connector.clone()),
        relay: Arc::new(relay.clone()),
        render: Arc::new(sink.clone()),
    };
    let (handle, events) = MeshHandle::spawn(local_id.into(), config, parts);

    SpawnedMesh {
        handle,
        relay,
        sink,
        connector,
        devices,
        events,
    }
}

/// Polls `condition` every 10ms until it holds or `timeout_ms` elapses.
pub async fn wait_until<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

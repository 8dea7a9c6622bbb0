use meshcall_peer::{MeshConfig, MeshEvent, PeerState};

use crate::integration::{drain_events, id_set, init_tracing, players, test_mesh};
use crate::utils::ScriptedDevices;

#[tokio::test]
async fn test_leaving_participant_detached() {
    init_tracing();

    let mut mesh = test_mesh("5", MeshConfig::default(), ScriptedDevices::camera());
    mesh.coordinator.acquire_media().await;
    mesh.coordinator.on_roster_update(players(&["5", "3", "9"])).await;
    drain_events(&mut mesh.events);

    mesh.coordinator.on_roster_update(players(&["5", "9"])).await;

    assert_eq!(mesh.coordinator.link_ids(), id_set(&["9"]));
    assert_eq!(mesh.sink.detach_count("3"), 1);
    assert_eq!(mesh.sink.detach_count("9"), 0);
    assert!(mesh.connector.latest("3").transport.is_closed());
    assert!(!mesh.connector.latest("9").transport.is_closed());

    let events = drain_events(&mut mesh.events);
    assert!(events.contains(&MeshEvent::LinkState {
        remote_id: "3".into(),
        state: PeerState::Closed,
    }));

    // Repeating the snapshot changes nothing
    mesh.coordinator.on_roster_update(players(&["5", "9"])).await;
    assert_eq!(mesh.sink.detach_count("3"), 1);
    assert_eq!(mesh.connector.links().len(), 2);
}

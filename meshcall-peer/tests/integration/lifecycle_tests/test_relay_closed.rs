use meshcall_core::Signal;
use meshcall_peer::{MeshConfig, MeshEvent};

use crate::integration::{drain_events, id_set, init_tracing, players, test_mesh};
use crate::utils::ScriptedDevices;

#[tokio::test]
async fn test_relay_closure_drops_unfinished_links() {
    init_tracing();

    let mut mesh = test_mesh("5", MeshConfig::default(), ScriptedDevices::camera());
    mesh.coordinator.acquire_media().await;
    mesh.coordinator.on_roster_update(players(&["5", "3", "9"])).await;
    mesh.coordinator
        .on_signal("9".into(), Signal::Offer { sdp: "remote".into() })
        .await
        .unwrap();
    drain_events(&mut mesh.events);

    mesh.coordinator.on_relay_closed().await;
    mesh.coordinator.on_relay_closed().await;

    // "3" was still waiting for an answer; "9" had finished negotiating
    assert_eq!(mesh.coordinator.link_ids(), id_set(&["9"]));
    assert!(!mesh.coordinator.view().relay_connected());
    assert_eq!(mesh.devices.live_track_count(), 1);

    let disconnects = drain_events(&mut mesh.events)
        .into_iter()
        .filter(|e| *e == MeshEvent::RelayDisconnected)
        .count();
    assert_eq!(disconnects, 1);
}

#[tokio::test]
async fn test_failed_send_marks_relay_disconnected() {
    init_tracing();

    let mut mesh = test_mesh("5", MeshConfig::default(), ScriptedDevices::camera());
    mesh.relay.close();

    mesh.coordinator.on_roster_update(players(&["5", "3"])).await;

    assert_eq!(mesh.coordinator.link_ids(), id_set(&["3"]));
    assert!(!mesh.coordinator.view().relay_connected());
    assert!(drain_events(&mut mesh.events).contains(&MeshEvent::RelayDisconnected));
}

use std::time::Duration;

use meshcall_core::Signal;
use meshcall_peer::MeshConfig;

use crate::integration::{init_tracing, players, spawn_mesh, test_mesh, wait_until};
use crate::utils::ScriptedDevices;

#[tokio::test]
async fn test_teardown_twice_leaves_nothing() {
    init_tracing();

    let mut mesh = test_mesh("5", MeshConfig::default(), ScriptedDevices::camera());
    mesh.coordinator.acquire_media().await;
    mesh.coordinator.on_roster_update(players(&["5", "3", "9"])).await;
    assert_eq!(mesh.devices.live_track_count(), 1);

    for _ in 0..2 {
        mesh.coordinator.teardown().await;

        assert!(mesh.coordinator.link_ids().is_empty());
        assert!(mesh.coordinator.view().is_empty());
        assert_eq!(mesh.devices.live_track_count(), 0);
        assert!(mesh.coordinator.media().live_tracks().is_empty());
    }

    assert_eq!(mesh.sink.detach_count("3"), 1);
    assert_eq!(mesh.sink.detach_count("9"), 1);
    assert!(mesh.connector.links().iter().all(|l| l.transport.is_closed()));

    // Input after teardown is ignored
    mesh.coordinator.on_roster_update(players(&["5", "3"])).await;
    mesh.coordinator
        .on_signal("9".into(), Signal::Offer { sdp: "late".into() })
        .await
        .unwrap();
    assert!(mesh.coordinator.link_ids().is_empty());
    assert_eq!(mesh.connector.links().len(), 2);
}

#[tokio::test]
async fn test_teardown_through_handle_twice() {
    init_tracing();

    let mesh = spawn_mesh("5", MeshConfig::default(), ScriptedDevices::camera());
    mesh.handle.roster_update(players(&["5", "3", "9"])).await.unwrap();

    let view = mesh.handle.view().clone();
    assert!(wait_until(2000, || view.len() == 2).await);

    mesh.handle.teardown().await.unwrap();
    mesh.handle.teardown().await.unwrap();

    assert!(view.is_empty());
    assert_eq!(mesh.devices.live_track_count(), 0);
    assert_eq!(mesh.sink.detach_count("3"), 1);
    assert_eq!(mesh.sink.detach_count("9"), 1);
}

#[tokio::test]
async fn test_teardown_during_acquisition_stops_late_tracks() {
    init_tracing();

    let devices = ScriptedDevices::camera().delayed(Duration::from_millis(100));
    let mesh = spawn_mesh("5", MeshConfig::default(), devices);

    mesh.handle.teardown().await.unwrap();

    let devices = mesh.devices.clone();
    assert!(
        wait_until(2000, || devices.tracks().len() == 1 && devices.live_track_count() == 0).await,
        "capture finishing after teardown must not leave a live track"
    );
    assert_eq!(mesh.devices.opens(), 1);
    assert!(!mesh.handle.view().camera_available());
}

use meshcall_core::{Role, Signal};
use meshcall_peer::MeshConfig;

use crate::integration::{id_set, init_tracing, roster, test_mesh};
use crate::utils::ScriptedDevices;

#[tokio::test]
async fn test_host_is_kept_out_of_the_mesh() {
    init_tracing();

    let config = MeshConfig::default().excluding(Role::Host);
    let mut mesh = test_mesh("5", config, ScriptedDevices::camera());
    mesh.coordinator.acquire_media().await;

    mesh.coordinator
        .on_roster_update(roster(&[
            ("1", Role::Host),
            ("5", Role::Player),
            ("9", Role::Player),
        ]))
        .await;
    assert_eq!(mesh.coordinator.link_ids(), id_set(&["9"]));

    // Signals from the excluded host are dropped
    mesh.coordinator
        .on_signal("1".into(), Signal::Offer { sdp: "v=0".into() })
        .await
        .unwrap();
    assert_eq!(mesh.coordinator.link_ids(), id_set(&["9"]));
    assert!(mesh.connector.links_to("1").is_empty());
}

#[tokio::test]
async fn test_excluded_self_joins_nothing() {
    init_tracing();

    let config = MeshConfig::default().excluding(Role::Host);
    let mut mesh = test_mesh("1", config, ScriptedDevices::camera());

    mesh.coordinator
        .on_roster_update(roster(&[
            ("1", Role::Host),
            ("5", Role::Player),
            ("9", Role::Player),
        ]))
        .await;

    assert!(mesh.coordinator.link_ids().is_empty());
    assert!(mesh.connector.links().is_empty());
}

#[tokio::test]
async fn test_host_joins_without_exclusion() {
    init_tracing();

    let mut mesh = test_mesh("5", MeshConfig::default(), ScriptedDevices::camera());
    mesh.coordinator
        .on_roster_update(roster(&[("1", Role::Host), ("5", Role::Player)]))
        .await;

    assert_eq!(mesh.coordinator.link_ids(), id_set(&["1"]));
}

use meshcall_core::{Signal, SignalKind};
use meshcall_peer::{LinkRole, MeshConfig, PeerState};

use crate::integration::{id_set, init_tracing, players, test_mesh};
use crate::utils::ScriptedDevices;

#[tokio::test]
async fn test_offer_before_roster_creates_responder_link() {
    init_tracing();

    let mut mesh = test_mesh("5", MeshConfig::default(), ScriptedDevices::camera());
    mesh.coordinator.acquire_media().await;

    mesh.coordinator
        .on_signal("9".into(), Signal::Offer { sdp: "remote-offer".into() })
        .await
        .unwrap();

    let link = mesh.coordinator.link(&"9".into()).unwrap();
    assert_eq!(link.role(), LinkRole::Responder);
    assert_eq!(link.state(), PeerState::Connected);
    assert_eq!(mesh.relay.count("9", SignalKind::Answer), 1);

    // The roster catching up reuses the same link
    mesh.coordinator.on_roster_update(players(&["5", "9"])).await;
    assert_eq!(mesh.coordinator.link_ids(), id_set(&["9"]));
    assert_eq!(mesh.connector.links_to("9").len(), 1);
}

#[tokio::test]
async fn test_relayed_signal_with_numeric_sender() {
    init_tracing();

    let mut mesh = test_mesh("5", MeshConfig::default(), ScriptedDevices::camera());
    mesh.coordinator.acquire_media().await;

    mesh.coordinator
        .on_relay_text(r#"{"type":"signal","fromId":9,"signal":{"type":"offer","sdp":"v=0"}}"#)
        .await
        .unwrap();

    assert_eq!(mesh.coordinator.link_ids(), id_set(&["9"]));
    assert_eq!(mesh.relay.count("9", SignalKind::Answer), 1);
}

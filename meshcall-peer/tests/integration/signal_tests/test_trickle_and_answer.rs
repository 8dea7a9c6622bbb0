use meshcall_core::{IceCandidate, Signal};
use meshcall_peer::{MeshConfig, TransportEvent};

use crate::integration::{init_tracing, players, test_mesh};
use crate::utils::ScriptedDevices;

#[tokio::test]
async fn test_local_candidates_are_relayed_immediately() {
    init_tracing();

    let mut mesh = test_mesh("5", MeshConfig::default(), ScriptedDevices::camera());
    mesh.coordinator.acquire_media().await;
    mesh.coordinator.on_roster_update(players(&["5", "3"])).await;

    let link = mesh.connector.latest("3");
    let candidate = IceCandidate {
        candidate: "candidate:1 1 udp 2122260223 10.0.0.5 50000 typ host".into(),
        sdp_mid: Some("0".into()),
        sdp_m_line_index: Some(0),
        username_fragment: None,
    };
    link.emit(TransportEvent::CandidateGenerated(link.key.clone(), candidate.clone()))
        .await;
    mesh.coordinator.drain_transport_events().await;

    // Offer first, then the candidate, before any answer arrived
    let sent = mesh.relay.sent_to("3");
    assert_eq!(sent.len(), 2);
    assert!(matches!(sent[0], Signal::Offer { .. }));
    assert_eq!(sent[1], Signal::IceCandidate { candidate });
}

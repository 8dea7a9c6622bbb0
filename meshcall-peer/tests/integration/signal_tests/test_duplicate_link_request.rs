use meshcall_core::SignalKind;
use meshcall_peer::MeshConfig;

use crate::integration::{init_tracing, players, test_mesh};
use crate::utils::ScriptedDevices;

#[tokio::test]
async fn test_duplicate_link_request() {
    init_tracing();

    let mut mesh = test_mesh("5", MeshConfig::default(), ScriptedDevices::camera());
    mesh.coordinator.acquire_media().await;

    let first = mesh.coordinator.ensure_link(&"3".into()).await.unwrap();
    let second = mesh.coordinator.ensure_link(&"3".into()).await.unwrap();
    mesh.coordinator.on_roster_update(players(&["3", "5"])).await;
    let third = mesh.coordinator.ensure_link(&"3".into()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first, third);
    assert_eq!(mesh.connector.links_to("3").len(), 1);
    assert_eq!(mesh.relay.count("3", SignalKind::Offer), 1);
}

use crate::peer::{LinkRole, PeerLink, PeerState};
use crate::transport::ConnectionState;
use dashmap::DashMap;
use meshcall_core::ParticipantId;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkStatus {
    pub remote_id: ParticipantId,
    pub role: LinkRole,
    pub state: PeerState,
    pub connection: ConnectionState,
    pub media_attached: bool,
}

/// Read-only snapshot of the mesh, shared with other tasks.
/// Safe to clone and send between threads; only the coordinator writes it.
#[derive(Clone)]
pub struct MeshView {
    links: Arc<DashMap<ParticipantId, LinkStatus>>,
    camera_available: Arc<AtomicBool>,
    relay_connected: Arc<AtomicBool>,
}

impl Default for MeshView {
    fn default() -> Self {
        Self {
            links: Arc::new(DashMap::new()),
            camera_available: Arc::new(AtomicBool::new(false)),
            relay_connected: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl MeshView {
    pub fn link(&self, remote_id: &ParticipantId) -> Option<LinkStatus> {
        self.links.get(remote_id).map(|entry| entry.value().clone())
    }

    /// Every link, ordered by remote id.
    pub fn links(&self) -> Vec<LinkStatus> {
        let mut links: Vec<_> = self.links.iter().map(|e| e.value().clone()).collect();
        links.sort_by(|a, b| a.remote_id.cmp(&b.remote_id));
        links
    }

    pub fn link_ids(&self) -> BTreeSet<ParticipantId> {
        self.links.iter().map(|e| e.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn connected_count(&self) -> usize {
        self.links
            .iter()
            .filter(|e| e.value().connection == ConnectionState::Connected)
            .count()
    }

    pub fn camera_available(&self) -> bool {
        self.camera_available.load(Ordering::Acquire)
    }

    pub fn relay_connected(&self) -> bool {
        self.relay_connected.load(Ordering::Acquire)
    }

    /// Returns the previous negotiation state, if the link was known.
    pub(crate) fn update(&self, link: &PeerLink) -> Option<PeerState> {
        let status = LinkStatus {
            remote_id: link.remote_id().clone(),
            role: link.role(),
            state: link.state(),
            connection: link.connection(),
            media_attached: link.media_attached(),
        };
        self.links
            .insert(status.remote_id.clone(), status)
            .map(|previous| previous.state)
    }

    pub(crate) fn remove(&self, remote_id: &ParticipantId) {
        self.links.remove(remote_id);
    }

    pub(crate) fn clear(&self) {
        self.links.clear();
    }

    pub(crate) fn set_camera_available(&self, available: bool) {
        self.camera_available.store(available, Ordering::Release);
    }

    /// Returns whether the flag changed.
    pub(crate) fn set_relay_connected(&self, connected: bool) -> bool {
        self.relay_connected.swap(connected, Ordering::AcqRel) != connected
    }
}

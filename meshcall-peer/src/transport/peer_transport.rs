use crate::media::LocalTrack;
use crate::peer::LinkRole;
use crate::transport::transport_event::{LinkKey, TransportEvent};
use anyhow::Result;
use async_trait::async_trait;
use meshcall_core::IceCandidate;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteDescription {
    Offer(String),
    Answer(String),
}

/// One native peer connection, as seen by a `PeerLink`.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Creates an offer, applies it as the local description and returns its SDP.
    async fn create_offer(&self) -> Result<String>;

    /// Creates an answer, applies it as the local description and returns its SDP.
    async fn create_answer(&self) -> Result<String>;

    async fn set_remote_description(&self, description: RemoteDescription) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

/// What a new connection is built from.
#[derive(Clone)]
pub struct LinkSetup {
    pub key: LinkKey,
    pub role: LinkRole,
    pub tracks: Vec<LocalTrack>,
}

/// Opens native connections. Callbacks of the returned transport report
/// through `events`, tagged with `setup.key`.
#[async_trait]
pub trait PeerConnector: Send + Sync {
    async fn connect(
        &self,
        setup: LinkSetup,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn PeerTransport>>;
}

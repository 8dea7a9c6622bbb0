use anyhow::Result;
use async_trait::async_trait;
use meshcall_core::{IceCandidate, MediaKind, ParticipantId};
use meshcall_peer::{
    LinkKey, LinkRole, LinkSetup, PeerConnector, PeerTransport, RemoteDescription, TransportEvent,
};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    CreateOffer,
    CreateAnswer,
    SetRemote(RemoteDescription),
    AddCandidate(String),
    Close,
}

/// Scripted PeerTransport: succeeds at everything and records each call.
pub struct FakeTransport {
    key: LinkKey,
    calls: Mutex<Vec<TransportCall>>,
}

impl FakeTransport {
    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.calls.lock().contains(&TransportCall::Close)
    }

    pub fn candidates(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                TransportCall::AddCandidate(line) => Some(line.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl PeerTransport for FakeTransport {
    async fn create_offer(&self) -> Result<String> {
        self.calls.lock().push(TransportCall::CreateOffer);
        Ok(format!("offer-{}", self.key))
    }

    async fn create_answer(&self) -> Result<String> {
        self.calls.lock().push(TransportCall::CreateAnswer);
        Ok(format!("answer-{}", self.key))
    }

    async fn set_remote_description(&self, description: RemoteDescription) -> Result<()> {
        self.calls.lock().push(TransportCall::SetRemote(description));
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()> {
        self.calls
            .lock()
            .push(TransportCall::AddCandidate(candidate.candidate));
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.calls.lock().push(TransportCall::Close);
        Ok(())
    }
}

/// One connection opened through the fake connector.
#[derive(Clone)]
pub struct FakeLink {
    pub key: LinkKey,
    pub role: LinkRole,
    pub track_kinds: Vec<MediaKind>,
    pub transport: Arc<FakeTransport>,
    pub events: mpsc::Sender<TransportEvent>,
}

impl FakeLink {
    /// Injects an event as if raised by the native connection.
    pub async fn emit(&self, event: TransportEvent) {
        self.events.send(event).await.expect("coordinator gone");
    }
}

/// Mock PeerConnector that hands out FakeTransports.
#[derive(Clone, Default)]
pub struct FakeConnector {
    links: Arc<Mutex<Vec<FakeLink>>>,
    refused: Arc<Mutex<HashSet<ParticipantId>>>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every connection attempt toward `remote_id` fail.
    pub fn refuse(&self, remote_id: &str) {
        self.refused.lock().insert(remote_id.into());
    }

    pub fn links(&self) -> Vec<FakeLink> {
        self.links.lock().clone()
    }

    pub fn links_to(&self, remote_id: &str) -> Vec<FakeLink> {
        self.links
            .lock()
            .iter()
            .filter(|l| l.key.remote_id.as_str() == remote_id)
            .cloned()
            .collect()
    }

    pub fn latest(&self, remote_id: &str) -> FakeLink {
        self.links_to(remote_id)
            .pop()
            .unwrap_or_else(|| panic!("no link to {remote_id}"))
    }
}

#[async_trait]
impl PeerConnector for FakeConnector {
    async fn connect(
        &self,
        setup: LinkSetup,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn PeerTransport>> {
        if self.refused.lock().contains(&setup.key.remote_id) {
            anyhow::bail!("connection to {} refused", setup.key.remote_id);
        }

        let transport = Arc::new(FakeTransport {
            key: setup.key.clone(),
            calls: Mutex::new(Vec::new()),
        });
        self.links.lock().push(FakeLink {
            key: setup.key,
            role: setup.role,
            track_kinds: setup.tracks.iter().map(|t| t.kind()).collect(),
            transport: transport.clone(),
            events,
        });
        Ok(transport)
    }
}

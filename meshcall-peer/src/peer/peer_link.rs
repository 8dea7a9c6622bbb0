use crate::error::NegotiationError;
use crate::peer::link_role::LinkRole;
use crate::peer::peer_state::PeerState;
use crate::transport::{ConnectionState, LinkKey, PeerTransport, RemoteDescription};
use meshcall_core::{IceCandidate, ParticipantId, Signal};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Candidates held per link while the remote description is missing.
pub const MAX_PENDING_CANDIDATES: usize = 128;

/// One (local, remote) connection and its offer/answer/ICE sequencing.
///
/// Methods return the signal, if any, that has to be relayed to the remote.
/// Inbound candidates that arrive before the remote description are queued
/// and applied in arrival order right after it is set.
pub struct PeerLink {
    key: LinkKey,
    role: LinkRole,
    state: PeerState,
    transport: Arc<dyn PeerTransport>,
    pending_candidates: VecDeque<IceCandidate>,
    remote_description_set: bool,
    connection: ConnectionState,
    media_attached: bool,
}

impl PeerLink {
    pub fn new(key: LinkKey, role: LinkRole, transport: Arc<dyn PeerTransport>) -> Self {
        Self {
            key,
            role,
            state: PeerState::Idle,
            transport,
            pending_candidates: VecDeque::new(),
            remote_description_set: false,
            connection: ConnectionState::New,
            media_attached: false,
        }
    }

    pub fn key(&self) -> &LinkKey {
        &self.key
    }

    pub fn remote_id(&self) -> &ParticipantId {
        &self.key.remote_id
    }

    pub fn epoch(&self) -> u64 {
        self.key.epoch
    }

    pub fn role(&self) -> LinkRole {
        self.role
    }

    pub fn state(&self) -> PeerState {
        self.state
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn media_attached(&self) -> bool {
        self.media_attached
    }

    pub fn pending_candidates(&self) -> usize {
        self.pending_candidates.len()
    }

    /// True when an inbound offer can only mean the remote started over on
    /// a new connection: we are the responder and already past waiting.
    pub fn is_superseded_by_offer(&self) -> bool {
        self.role == LinkRole::Responder && self.state != PeerState::AwaitingOffer
    }

    pub(crate) fn set_connection(&mut self, connection: ConnectionState) {
        self.connection = connection;
    }

    pub(crate) fn mark_media_attached(&mut self) {
        self.media_attached = true;
    }

    /// Leaves `Idle`. The initiator produces its offer here; the responder
    /// starts waiting for one.
    pub async fn start(&mut self) -> Result<Option<Signal>, NegotiationError> {
        if self.state != PeerState::Idle {
            return Ok(None);
        }

        match self.role {
            LinkRole::Initiator => {
                self.transition(PeerState::Offering);
                let sdp = self.transport.create_offer().await?;
                self.transition(PeerState::AwaitingAnswer);
                Ok(Some(Signal::Offer { sdp }))
            }
            LinkRole::Responder => {
                self.transition(PeerState::AwaitingOffer);
                Ok(None)
            }
        }
    }

    pub async fn handle_signal(&mut self, signal: Signal) -> Result<Option<Signal>, NegotiationError> {
        match signal {
            Signal::Offer { sdp } if self.state == PeerState::AwaitingOffer => {
                self.accept_offer(sdp).await.map(Some)
            }
            Signal::Answer { sdp } if self.state == PeerState::AwaitingAnswer => {
                self.accept_answer(sdp).await?;
                Ok(None)
            }
            Signal::IceCandidate { candidate } => {
                self.add_remote_candidate(candidate).await?;
                Ok(None)
            }
            other => Err(NegotiationError::UnexpectedSignal {
                state: self.state,
                signal: other.kind(),
            }),
        }
    }

    async fn accept_offer(&mut self, sdp: String) -> Result<Signal, NegotiationError> {
        self.transition(PeerState::Answering);
        self.transport
            .set_remote_description(RemoteDescription::Offer(sdp))
            .await?;
        self.remote_description_applied().await;

        let answer = self.transport.create_answer().await?;
        self.transition(PeerState::Connected);
        Ok(Signal::Answer { sdp: answer })
    }

    async fn accept_answer(&mut self, sdp: String) -> Result<(), NegotiationError> {
        self.transport
            .set_remote_description(RemoteDescription::Answer(sdp))
            .await?;
        self.remote_description_applied().await;
        self.transition(PeerState::Connected);
        Ok(())
    }

    async fn add_remote_candidate(&mut self, candidate: IceCandidate) -> Result<(), NegotiationError> {
        if self.state.is_closed() {
            return Ok(());
        }
        if candidate.is_end_of_candidates() {
            debug!("End of remote candidates for {}", self.key);
            return Ok(());
        }
        if !self.remote_description_set {
            if self.pending_candidates.len() >= MAX_PENDING_CANDIDATES {
                warn!(
                    "Dropping candidate for {}: {} already pending",
                    self.key, MAX_PENDING_CANDIDATES
                );
                return Ok(());
            }
            debug!(
                "Queueing candidate for {} until remote description ({} pending)",
                self.key,
                self.pending_candidates.len() + 1
            );
            self.pending_candidates.push_back(candidate);
            return Ok(());
        }

        self.transport.add_ice_candidate(candidate).await?;
        Ok(())
    }

    async fn remote_description_applied(&mut self) {
        self.remote_description_set = true;

        while let Some(candidate) = self.pending_candidates.pop_front() {
            if let Err(e) = self.transport.add_ice_candidate(candidate).await {
                warn!("Dropping queued candidate for {}: {:#}", self.key, e);
            }
        }
    }

    /// Closes the native connection. Idempotent.
    pub async fn close(&mut self) {
        if self.state.is_closed() {
            return;
        }
        self.transition(PeerState::Closed);
        self.pending_candidates.clear();
        if let Err(e) = self.transport.close().await {
            warn!("Error closing transport for {}: {:#}", self.key, e);
        }
    }

    fn transition(&mut self, next: PeerState) {
        info!("Link {} ({}): {} -> {}", self.key, self.role, self.state, next);
        self.state = next;
    }
}

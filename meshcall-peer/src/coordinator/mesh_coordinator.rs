use crate::config::MeshConfig;
use crate::coordinator::coordinator_command::CoordinatorCommand;
use crate::coordinator::mesh_event::MeshEvent;
use crate::coordinator::mesh_view::MeshView;
use crate::error::{MediaError, MeshError, NegotiationError};
use crate::media::{LocalMediaSession, MediaDevices, MediaHandle};
use crate::peer::{LinkRole, PeerLink, PeerState};
use crate::render::RenderSink;
use crate::signaling::SignalRelay;
use crate::transport::{ConnectionState, LinkKey, LinkSetup, PeerConnector, TransportEvent};
use meshcall_core::{MediaKind, ParticipantId, RelayMessage, Roster, Signal, SignalEnvelope};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const TRANSPORT_EVENT_BUFFER: usize = 256;

/// External collaborators of a coordinator.
#[derive(Clone)]
pub struct MeshParts {
    pub devices: Arc<dyn MediaDevices>,
    pub connector: Arc<dyn PeerConnector>,
    pub relay: Arc<dyn SignalRelay>,
    pub render: Arc<dyn RenderSink>,
}

/// Owns the link table and keeps it equal to the roster.
///
/// One task runs the coordinator; every handler completes before the next
/// input is taken, so the table is never observed half-updated. The public
/// handlers can also be driven directly, without `run`.
pub struct MeshCoordinator {
    local_id: ParticipantId,
    config: MeshConfig,
    parts: MeshParts,
    media: Arc<LocalMediaSession>,
    links: HashMap<ParticipantId, PeerLink>,
    excluded_remotes: HashSet<ParticipantId>,
    self_excluded: bool,
    next_epoch: u64,
    stopped: bool,
    view: MeshView,
    command_rx: mpsc::Receiver<CoordinatorCommand>,
    transport_rx: mpsc::Receiver<TransportEvent>,
    transport_tx: mpsc::Sender<TransportEvent>,
    events: mpsc::UnboundedSender<MeshEvent>,
}

impl MeshCoordinator {
    pub fn new(
        local_id: ParticipantId,
        config: MeshConfig,
        parts: MeshParts,
        command_rx: mpsc::Receiver<CoordinatorCommand>,
        events: mpsc::UnboundedSender<MeshEvent>,
    ) -> Self {
        let (transport_tx, transport_rx) = mpsc::channel(TRANSPORT_EVENT_BUFFER);

        Self {
            local_id,
            config,
            parts,
            media: Arc::new(LocalMediaSession::new()),
            links: HashMap::new(),
            excluded_remotes: HashSet::new(),
            self_excluded: false,
            next_epoch: 0,
            stopped: false,
            view: MeshView::default(),
            command_rx,
            transport_rx,
            transport_tx,
            events,
        }
    }

    pub fn local_id(&self) -> &ParticipantId {
        &self.local_id
    }

    pub fn view(&self) -> MeshView {
        self.view.clone()
    }

    pub fn link(&self, remote_id: &ParticipantId) -> Option<&PeerLink> {
        self.links.get(remote_id)
    }

    pub fn link_ids(&self) -> BTreeSet<ParticipantId> {
        self.links.keys().cloned().collect()
    }

    pub fn media(&self) -> &LocalMediaSession {
        &self.media
    }

    pub async fn run(mut self) {
        info!("Mesh coordinator for {} started", self.local_id);

        let media = self.media.clone();
        let devices = self.parts.devices.clone();
        let constraints = self.config.media.clone();
        let acquisition = async move { media.acquire(devices.as_ref(), &constraints).await };
        tokio::pin!(acquisition);

        let mut media_settled = false;
        let mut deferred = VecDeque::new();

        loop {
            tokio::select! {
                result = &mut acquisition, if !media_settled => {
                    media_settled = true;
                    self.media_settled(result);
                    if !deferred.is_empty() {
                        debug!("Replaying {} deferred command(s)", deferred.len());
                    }
                    while let Some(cmd) = deferred.pop_front() {
                        self.handle_command(cmd).await;
                    }
                }

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(c) if !media_settled && c.waits_for_media() => deferred.push_back(c),
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("Command channel closed. Shutting down mesh.");
                            break;
                        }
                    }
                }

                Some(event) = self.transport_rx.recv() => {
                    self.on_transport_event(event).await;
                }
            }
        }

        self.teardown().await;
        info!("Mesh coordinator for {} finished", self.local_id);
    }

    async fn handle_command(&mut self, cmd: CoordinatorCommand) {
        match cmd {
            CoordinatorCommand::RosterUpdate(roster) => self.on_roster_update(roster).await,
            CoordinatorCommand::RelayText(text) => {
                if let Err(e) = self.on_relay_text(&text).await {
                    warn!("Relay message not applied: {}", e);
                }
            }
            CoordinatorCommand::Signal { from, signal } => {
                if let Err(e) = self.on_signal(from.clone(), signal).await {
                    warn!("Signal from {} not applied: {}", from, e);
                }
            }
            CoordinatorCommand::RelayClosed => self.on_relay_closed().await,
            CoordinatorCommand::SetMediaEnabled { kind, enabled } => {
                self.set_media_enabled(kind, enabled);
            }
            CoordinatorCommand::Teardown { done } => {
                self.teardown().await;
                let _ = done.send(());
            }
        }
    }

    /// Acquires local capture (once). Without media the mesh keeps going
    /// with track-less links.
    pub async fn acquire_media(&mut self) -> Option<MediaHandle> {
        let result = self
            .media
            .acquire(self.parts.devices.as_ref(), &self.config.media)
            .await;
        self.media_settled(result)
    }

    fn media_settled(&mut self, result: Result<MediaHandle, MediaError>) -> Option<MediaHandle> {
        match result {
            Ok(handle) => {
                self.view.set_camera_available(!handle.tracks().is_empty());
                Some(handle)
            }
            Err(MediaError::Released) => None,
            Err(reason) => {
                warn!("Continuing without local media: {}", reason);
                self.view.set_camera_available(false);
                self.emit(MeshEvent::CameraUnavailable { reason });
                None
            }
        }
    }

    /// Reconciles the link table against a full roster snapshot.
    pub async fn on_roster_update(&mut self, roster: Roster) {
        if self.stopped {
            debug!("Ignoring roster update after teardown");
            return;
        }

        let excluded = &self.config.excluded_roles;
        self.self_excluded = roster
            .get(&self.local_id)
            .is_some_and(|me| excluded.contains(&me.role));
        self.excluded_remotes = roster
            .participants()
            .iter()
            .filter(|p| excluded.contains(&p.role))
            .map(|p| p.id.clone())
            .collect();

        let wanted = roster.mesh_members(&self.local_id, excluded);
        let current = self.link_ids();
        debug!(
            "Roster of {} for {}: {} wanted, {} current",
            roster.len(),
            self.local_id,
            wanted.len(),
            current.len()
        );

        for gone in current.difference(&wanted) {
            info!("{} left the mesh", gone);
            self.remove_link(gone).await;
        }

        for new in wanted.difference(&current) {
            if let Err(e) = self.ensure_link(new).await {
                self.report_failure(new, &e);
            }
        }
    }

    /// Parses one relay message and applies it if it concerns the mesh.
    pub async fn on_relay_text(&mut self, text: &str) -> Result<(), MeshError> {
        match RelayMessage::parse(text)? {
            RelayMessage::PlayersUpdate { players, .. } => {
                self.on_roster_update(players).await;
                Ok(())
            }
            RelayMessage::Signal { from_id, signal } => Ok(self.on_signal(from_id, signal).await?),
            other => {
                debug!("Ignoring non-mesh relay message: {:?}", other);
                Ok(())
            }
        }
    }

    /// Routes a signal to the link for `from`, creating the link if the
    /// sender raced ahead of the roster.
    pub async fn on_signal(&mut self, from: ParticipantId, signal: Signal) -> Result<(), NegotiationError> {
        if self.stopped {
            debug!("Ignoring {} from {} after teardown", signal.kind(), from);
            return Ok(());
        }
        if from == self.local_id {
            warn!("Dropping {} addressed from ourselves", signal.kind());
            return Ok(());
        }
        if self.self_excluded || self.excluded_remotes.contains(&from) {
            debug!("Dropping {} from {}: outside the mesh", signal.kind(), from);
            return Ok(());
        }

        debug!("<- {} from {}", signal.kind(), from);
        if matches!(signal, Signal::Offer { .. })
            && self
                .links
                .get(&from)
                .is_some_and(|link| link.is_superseded_by_offer())
        {
            info!("{} offered again; replacing its link", from);
            self.remove_link(&from).await;
        }
        if let Err(e) = self.ensure_link(&from).await {
            self.report_failure(&from, &e);
            return Err(e);
        }

        let Some(link) = self.links.get_mut(&from) else {
            return Ok(());
        };
        match link.handle_signal(signal).await {
            Ok(reply) => {
                self.sync_link(&from);
                if let Some(reply) = reply {
                    self.relay(&from, reply).await;
                }
                Ok(())
            }
            Err(e) => {
                self.report_failure(&from, &e);
                self.remove_link(&from).await;
                Err(e)
            }
        }
    }

    /// Returns the link for `remote_id`, creating and starting it if there
    /// is none. An existing link is returned untouched.
    pub async fn ensure_link(&mut self, remote_id: &ParticipantId) -> Result<LinkKey, NegotiationError> {
        if let Some(link) = self.links.get(remote_id) {
            return Ok(link.key().clone());
        }

        self.next_epoch += 1;
        let key = LinkKey::new(remote_id.clone(), self.next_epoch);
        let role = LinkRole::for_pair(&self.local_id, remote_id);
        let setup = LinkSetup {
            key: key.clone(),
            role,
            tracks: self.media.live_tracks(),
        };
        info!(
            "Opening link {} as {} with {} local track(s)",
            key,
            role,
            setup.tracks.len()
        );

        let transport = self
            .parts
            .connector
            .connect(setup, self.transport_tx.clone())
            .await?;

        let mut link = PeerLink::new(key.clone(), role, transport);
        let started = link.start().await;
        self.links.insert(remote_id.clone(), link);
        self.sync_link(remote_id);

        match started {
            Ok(Some(offer)) => {
                self.relay(remote_id, offer).await;
                Ok(key)
            }
            Ok(None) => Ok(key),
            Err(e) => {
                self.remove_link(remote_id).await;
                Err(e)
            }
        }
    }

    pub async fn on_transport_event(&mut self, event: TransportEvent) {
        if self.stopped {
            return;
        }

        let key = event.key().clone();
        let Some(link) = self
            .links
            .get_mut(&key.remote_id)
            .filter(|link| link.epoch() == key.epoch)
        else {
            debug!("Ignoring transport event from stale link {}", key);
            return;
        };

        match event {
            TransportEvent::CandidateGenerated(_, candidate) => {
                self.relay(&key.remote_id, Signal::IceCandidate { candidate })
                    .await;
            }
            TransportEvent::TrackReceived(_, media) => {
                info!("Inbound {} from {}", media.kind, key.remote_id);
                link.mark_media_attached();
                self.sync_link(&key.remote_id);
                self.parts.render.attach(&key.remote_id, media).await;
            }
            TransportEvent::StateChanged(_, state) => {
                link.set_connection(state);
                self.sync_link(&key.remote_id);
                self.emit(MeshEvent::ConnectionState {
                    remote_id: key.remote_id.clone(),
                    state,
                });

                if state == ConnectionState::Failed {
                    self.report_failure(&key.remote_id, &NegotiationError::ConnectionFailed);
                    self.remove_link(&key.remote_id).await;
                }
            }
        }
    }

    /// Applies every transport event already queued.
    pub async fn drain_transport_events(&mut self) {
        while let Ok(event) = self.transport_rx.try_recv() {
            self.on_transport_event(event).await;
        }
    }

    pub fn set_media_enabled(&mut self, kind: MediaKind, enabled: bool) {
        match self.media.current() {
            Some(handle) => {
                let toggled = handle.set_enabled(kind, enabled);
                info!("Local {} {} ({} track(s))", kind, if enabled { "enabled" } else { "disabled" }, toggled);
            }
            None => debug!("No local media to toggle"),
        }
    }

    /// The relay is gone: links still negotiating can never finish and are
    /// closed; established ones keep their media flowing.
    pub async fn on_relay_closed(&mut self) {
        if self.view.set_relay_connected(false) {
            warn!("Relay disconnected");
            self.emit(MeshEvent::RelayDisconnected);
        }

        let stalled: Vec<_> = self
            .links
            .values()
            .filter(|link| link.state() != PeerState::Connected)
            .map(|link| link.remote_id().clone())
            .collect();
        for remote_id in stalled {
            self.remove_link(&remote_id).await;
        }
    }

    /// Closes every link and releases local capture. Later input is ignored.
    pub async fn teardown(&mut self) {
        self.stopped = true;

        let remote_ids: Vec<_> = self.links.keys().cloned().collect();
        for remote_id in &remote_ids {
            self.remove_link(remote_id).await;
        }

        self.media.release();
        self.view.clear();
        self.view.set_camera_available(false);
        info!(
            "Mesh for {} torn down ({} link(s) closed)",
            self.local_id,
            remote_ids.len()
        );
    }

    async fn remove_link(&mut self, remote_id: &ParticipantId) {
        let Some(mut link) = self.links.remove(remote_id) else {
            return;
        };

        link.close().await;
        self.view.remove(remote_id);
        self.emit(MeshEvent::LinkState {
            remote_id: remote_id.clone(),
            state: PeerState::Closed,
        });
        self.parts.render.detach(remote_id).await;
        debug!("Link {} removed", link.key());
    }

    async fn relay(&self, target: &ParticipantId, signal: Signal) {
        let envelope = SignalEnvelope::new(self.local_id.clone(), target.clone(), signal);
        debug!("-> {} to {}", envelope.kind(), target);

        if let Err(e) = self.parts.relay.send(envelope).await {
            warn!("Could not relay signal to {}: {}", target, e);
            if self.view.set_relay_connected(false) {
                self.emit(MeshEvent::RelayDisconnected);
            }
        }
    }

    fn sync_link(&self, remote_id: &ParticipantId) {
        let Some(link) = self.links.get(remote_id) else {
            return;
        };
        if self.view.update(link) != Some(link.state()) {
            self.emit(MeshEvent::LinkState {
                remote_id: remote_id.clone(),
                state: link.state(),
            });
        }
    }

    fn report_failure(&self, remote_id: &ParticipantId, error: &NegotiationError) {
        warn!("Negotiation with {} failed: {:#}", remote_id, error);
        self.emit(MeshEvent::NegotiationFailed {
            remote_id: remote_id.clone(),
            reason: error.to_string(),
        });
    }

    fn emit(&self, event: MeshEvent) {
        let _ = self.events.send(event);
    }
}

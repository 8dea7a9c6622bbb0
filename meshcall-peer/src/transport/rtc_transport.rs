use crate::peer::LinkRole;
use crate::render::RemoteMedia;
use crate::transport::peer_transport::{LinkSetup, PeerConnector, PeerTransport, RemoteDescription};
use crate::transport::transport_config::TransportConfig;
use crate::transport::transport_event::{LinkKey, TransportEvent};
use anyhow::{Context, Result};
use async_trait::async_trait;
use meshcall_core::{IceCandidate, MediaKind};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::policy::bundle_policy::RTCBundlePolicy;
use webrtc::peer_connection::policy::ice_transport_policy::RTCIceTransportPolicy;
use webrtc::peer_connection::policy::rtcp_mux_policy::RTCRtcpMuxPolicy;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiverInit;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_remote::TrackRemote;

/// Opens webrtc-rs peer connections.
#[derive(Clone, Default)]
pub struct RtcConnector {
    config: TransportConfig,
}

impl RtcConnector {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PeerConnector for RtcConnector {
    async fn connect(
        &self,
        setup: LinkSetup,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn PeerTransport>> {
        let transport = RtcTransport::new(setup, &self.config, events).await?;
        Ok(Arc::new(transport))
    }
}

pub struct RtcTransport {
    key: LinkKey,
    peer_connection: Arc<RTCPeerConnection>,
}

impl RtcTransport {
    pub async fn new(
        setup: LinkSetup,
        config: &TransportConfig,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config
                .ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                })
                .collect(),
            bundle_policy: RTCBundlePolicy::MaxBundle,
            rtcp_mux_policy: RTCRtcpMuxPolicy::Require,
            ice_transport_policy: RTCIceTransportPolicy::All,
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .context("failed to create peer connection")?,
        );

        let state_tx = event_tx.clone();
        let state_key = setup.key.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                let key = state_key.clone();

                Box::pin(async move {
                    info!("Peer connection state for {}: {}", key, s);
                    let _ = tx.send(TransportEvent::StateChanged(key, s.into())).await;
                })
            },
        ));

        let ice_tx = event_tx.clone();
        let ice_key = setup.key.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            let key = ice_key.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let candidate = IceCandidate {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                    username_fragment: init.username_fragment,
                };
                let _ = tx
                    .send(TransportEvent::CandidateGenerated(key, candidate))
                    .await;
            })
        }));

        let track_tx = event_tx;
        let track_key = setup.key.clone();
        peer_connection.on_track(Box::new(move |track: Arc<TrackRemote>, _receiver, _transceiver| {
            let tx = track_tx.clone();
            let key = track_key.clone();

            Box::pin(async move {
                let kind = match track.kind() {
                    RTPCodecType::Audio => MediaKind::Audio,
                    _ => MediaKind::Video,
                };
                debug!("Remote {} track '{}' arrived on {}", kind, track.id(), key);
                let media = RemoteMedia::from_track(kind, track);
                let _ = tx.send(TransportEvent::TrackReceived(key, media)).await;
            })
        }));

        for track in &setup.tracks {
            let sender = peer_connection
                .add_track(track.rtp() as Arc<dyn TrackLocal + Send + Sync>)
                .await
                .with_context(|| format!("failed to add {} track", track.kind()))?;

            // RTCP has to be read for interceptors (NACK, reports) to run.
            tokio::spawn(async move {
                let mut rtcp_buf = vec![0u8; 1500];
                while sender.read(&mut rtcp_buf).await.is_ok() {}
            });
        }

        if setup.role == LinkRole::Initiator {
            for kind in &config.receive_only {
                if setup.tracks.iter().any(|t| t.kind() == *kind) {
                    continue;
                }
                let codec_type = match kind {
                    MediaKind::Audio => RTPCodecType::Audio,
                    MediaKind::Video => RTPCodecType::Video,
                };
                peer_connection
                    .add_transceiver_from_kind(
                        codec_type,
                        Some(RTCRtpTransceiverInit {
                            direction: RTCRtpTransceiverDirection::Recvonly,
                            send_encodings: vec![],
                        }),
                    )
                    .await
                    .with_context(|| format!("failed to add receive-only {kind} transceiver"))?;
            }
        }

        Ok(Self {
            key: setup.key,
            peer_connection,
        })
    }
}

#[async_trait]
impl PeerTransport for RtcTransport {
    async fn create_offer(&self) -> Result<String> {
        let offer = self.peer_connection.create_offer(None).await?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await?;
        Ok(offer.sdp)
    }

    async fn create_answer(&self) -> Result<String> {
        let answer = self.peer_connection.create_answer(None).await?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await?;
        Ok(answer.sdp)
    }

    async fn set_remote_description(&self, description: RemoteDescription) -> Result<()> {
        let desc = match description {
            RemoteDescription::Offer(sdp) => RTCSessionDescription::offer(sdp)?,
            RemoteDescription::Answer(sdp) => RTCSessionDescription::answer(sdp)?,
        };
        self.peer_connection
            .set_remote_description(desc)
            .await
            .with_context(|| format!("failed to apply remote description for {}", self.key))?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: candidate.username_fragment,
        };
        self.peer_connection.add_ice_candidate(init).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if let Err(e) = self.peer_connection.close().await {
            warn!("Closing peer connection for {} failed: {}", self.key, e);
            return Err(e.into());
        }
        Ok(())
    }
}

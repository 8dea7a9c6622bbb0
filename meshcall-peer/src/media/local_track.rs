use meshcall_core::MediaKind;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

struct TrackState {
    id: String,
    kind: MediaKind,
    rtp: Arc<TrackLocalStaticSample>,
    live: AtomicBool,
    enabled: AtomicBool,
}

/// A captured track. Clones share state: stopping one stops them all.
#[derive(Clone)]
pub struct LocalTrack {
    inner: Arc<TrackState>,
}

impl LocalTrack {
    pub fn new(kind: MediaKind, stream_id: &str) -> Self {
        let id = format!("{kind}-{}", Uuid::new_v4());
        let rtp = Arc::new(TrackLocalStaticSample::new(
            codec_for(kind),
            id.clone(),
            stream_id.to_owned(),
        ));

        Self {
            inner: Arc::new(TrackState {
                id,
                kind,
                rtp,
                live: AtomicBool::new(true),
                enabled: AtomicBool::new(true),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn kind(&self) -> MediaKind {
        self.inner.kind
    }

    pub fn rtp(&self) -> Arc<TrackLocalStaticSample> {
        self.inner.rtp.clone()
    }

    pub fn is_live(&self) -> bool {
        self.inner.live.load(Ordering::Acquire)
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::Acquire)
    }

    /// Mutes or unmutes without renegotiation.
    pub fn set_enabled(&self, enabled: bool) {
        self.inner.enabled.store(enabled, Ordering::Release);
    }

    /// Ends the track for good.
    pub fn stop(&self) {
        self.inner.live.store(false, Ordering::Release);
    }
}

impl std::fmt::Debug for LocalTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalTrack")
            .field("id", &self.inner.id)
            .field("kind", &self.inner.kind)
            .field("live", &self.is_live())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

fn codec_for(kind: MediaKind) -> RTCRtpCodecCapability {
    match kind {
        MediaKind::Video => RTCRtpCodecCapability {
            mime_type: MIME_TYPE_VP8.to_owned(),
            clock_rate: 90000,
            channels: 0,
            sdp_fmtp_line: String::new(),
            rtcp_feedback: vec![],
        },
        MediaKind::Audio => RTCRtpCodecCapability {
            mime_type: MIME_TYPE_OPUS.to_owned(),
            clock_rate: 48000,
            channels: 2,
            sdp_fmtp_line: String::new(),
            rtcp_feedback: vec![],
        },
    }
}

/// The set of tracks one acquisition produced.
#[derive(Debug, Clone)]
pub struct MediaHandle {
    tracks: Arc<[LocalTrack]>,
}

impl MediaHandle {
    pub fn new(tracks: Vec<LocalTrack>) -> Self {
        Self {
            tracks: tracks.into(),
        }
    }

    pub fn tracks(&self) -> &[LocalTrack] {
        &self.tracks
    }

    pub fn kinds(&self) -> Vec<MediaKind> {
        let mut kinds: Vec<_> = self.tracks.iter().map(LocalTrack::kind).collect();
        kinds.sort();
        kinds.dedup();
        kinds
    }

    pub fn has_kind(&self, kind: MediaKind) -> bool {
        self.tracks.iter().any(|t| t.kind() == kind)
    }

    /// Tracks that still carry media; stopped ones are never offered.
    pub fn live_tracks(&self) -> Vec<LocalTrack> {
        self.tracks.iter().filter(|t| t.is_live()).cloned().collect()
    }

    /// Returns how many tracks of `kind` were toggled.
    pub fn set_enabled(&self, kind: MediaKind, enabled: bool) -> usize {
        let mut toggled = 0;
        for track in self.tracks.iter().filter(|t| t.kind() == kind) {
            track.set_enabled(enabled);
            toggled += 1;
        }
        toggled
    }

    pub fn stop_all(&self) {
        for track in self.tracks.iter() {
            track.stop();
        }
    }
}

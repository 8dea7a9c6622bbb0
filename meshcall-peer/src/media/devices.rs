use crate::error::MediaError;
use crate::media::local_track::{LocalTrack, MediaHandle};
use async_trait::async_trait;
use bytes::Bytes;
use meshcall_core::{MediaConstraints, MediaKind};
use std::time::{Duration, SystemTime};
use tracing::{debug, trace};
use webrtc::media::Sample;

/// The platform's capture facility.
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Opens capture for the requested kinds. May suspend (e.g. on a
    /// permission prompt).
    async fn open(&self, constraints: &MediaConstraints) -> Result<MediaHandle, MediaError>;
}

/// A machine without capture hardware.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDevices;

#[async_trait]
impl MediaDevices for NoDevices {
    async fn open(&self, _constraints: &MediaConstraints) -> Result<MediaHandle, MediaError> {
        Err(MediaError::NoDevice)
    }
}

// Payloads only need to survive packetization; nobody decodes them.
const TEST_PATTERN_FRAME: &[u8] = &[
    0x10, 0x02, 0x00, 0x9d, 0x01, 0x2a, 0x80, 0x02, 0xe0, 0x01, 0x00, 0x47, 0x08, 0x85, 0x85,
    0x88, 0x85, 0x84, 0x88, 0x02, 0x02, 0x00,
];
const OPUS_SILENCE: &[u8] = &[0xf8, 0xff, 0xfe];
const AUDIO_FRAME: Duration = Duration::from_millis(20);

/// Test-pattern capture: one VP8 video track at the requested frame rate,
/// plus an Opus track of silence when audio is requested. Tracks emit
/// samples while live and enabled.
#[derive(Debug, Clone)]
pub struct SyntheticDevices {
    stream_id: String,
}

impl Default for SyntheticDevices {
    fn default() -> Self {
        Self::new("local")
    }
}

impl SyntheticDevices {
    pub fn new(stream_id: impl Into<String>) -> Self {
        Self {
            stream_id: stream_id.into(),
        }
    }
}

#[async_trait]
impl MediaDevices for SyntheticDevices {
    async fn open(&self, constraints: &MediaConstraints) -> Result<MediaHandle, MediaError> {
        let mut tracks = Vec::new();

        if let Some(video) = &constraints.video {
            let frame_rate = video.frame_rate.max(1);
            let track = LocalTrack::new(MediaKind::Video, &self.stream_id);
            spawn_pump(
                track.clone(),
                Bytes::from_static(TEST_PATTERN_FRAME),
                Duration::from_secs(1) / frame_rate,
            );
            tracks.push(track);
        }

        if constraints.audio.is_enabled() {
            let track = LocalTrack::new(MediaKind::Audio, &self.stream_id);
            spawn_pump(track.clone(), Bytes::from_static(OPUS_SILENCE), AUDIO_FRAME);
            tracks.push(track);
        }

        debug!("Synthetic capture opened with {} track(s)", tracks.len());
        Ok(MediaHandle::new(tracks))
    }
}

fn spawn_pump(track: LocalTrack, payload: Bytes, frame: Duration) {
    tokio::spawn(async move {
        let rtp = track.rtp();
        let mut ticker = tokio::time::interval(frame);

        while track.is_live() {
            ticker.tick().await;
            if !track.is_enabled() {
                continue;
            }
            let sample = Sample {
                data: payload.clone(),
                duration: frame,
                timestamp: SystemTime::now(),
                ..Default::default()
            };
            if let Err(e) = rtp.write_sample(&sample).await {
                trace!("Sample write on {} failed: {}", track.id(), e);
            }
        }

        debug!("Track {} stopped", track.id());
    });
}

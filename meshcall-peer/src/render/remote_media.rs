use meshcall_core::MediaKind;
use std::fmt;
use std::sync::Arc;
use webrtc::track::track_remote::TrackRemote;

/// Inbound media of one remote track, handed to a `RenderSink`.
#[derive(Clone)]
pub struct RemoteMedia {
    pub track_id: String,
    pub stream_id: String,
    pub kind: MediaKind,
    /// Native track to read RTP from. Absent for media not backed by a
    /// real connection.
    pub track: Option<Arc<TrackRemote>>,
}

impl RemoteMedia {
    pub fn from_track(kind: MediaKind, track: Arc<TrackRemote>) -> Self {
        Self {
            track_id: track.id(),
            stream_id: track.stream_id(),
            kind,
            track: Some(track),
        }
    }

    pub fn detached(kind: MediaKind, track_id: impl Into<String>, stream_id: impl Into<String>) -> Self {
        Self {
            track_id: track_id.into(),
            stream_id: stream_id.into(),
            kind,
            track: None,
        }
    }
}

impl fmt::Debug for RemoteMedia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteMedia")
            .field("track_id", &self.track_id)
            .field("stream_id", &self.stream_id)
            .field("kind", &self.kind)
            .field("native", &self.track.is_some())
            .finish()
    }
}

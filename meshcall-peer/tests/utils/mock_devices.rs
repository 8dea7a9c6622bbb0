use async_trait::async_trait;
use meshcall_core::{MediaConstraints, MediaKind};
use meshcall_peer::{LocalTrack, MediaDevices, MediaError, MediaHandle};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Mock MediaDevices with a fixed outcome and optional latency.
#[derive(Clone)]
pub struct ScriptedDevices {
    outcome: Result<Vec<MediaKind>, MediaError>,
    delay: Duration,
    opens: Arc<AtomicUsize>,
    handles: Arc<Mutex<Vec<MediaHandle>>>,
}

impl ScriptedDevices {
    pub fn with_kinds(kinds: &[MediaKind]) -> Self {
        Self {
            outcome: Ok(kinds.to_vec()),
            delay: Duration::ZERO,
            opens: Arc::new(AtomicUsize::new(0)),
            handles: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn camera() -> Self {
        Self::with_kinds(&[MediaKind::Video])
    }

    pub fn failing(error: MediaError) -> Self {
        Self {
            outcome: Err(error),
            ..Self::camera()
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Every track ever handed out, live or not.
    pub fn tracks(&self) -> Vec<LocalTrack> {
        self.handles
            .lock()
            .iter()
            .flat_map(|h| h.tracks().to_vec())
            .collect()
    }

    pub fn live_track_count(&self) -> usize {
        self.tracks().iter().filter(|t| t.is_live()).count()
    }
}

#[async_trait]
impl MediaDevices for ScriptedDevices {
    async fn open(&self, _constraints: &MediaConstraints) -> Result<MediaHandle, MediaError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let kinds = self.outcome.clone()?;
        let handle = MediaHandle::new(
            kinds
                .into_iter()
                .map(|kind| LocalTrack::new(kind, "test"))
                .collect(),
        );
        self.handles.lock().push(handle.clone());
        Ok(handle)
    }
}

use crate::error::MediaError;
use crate::media::devices::MediaDevices;
use crate::media::local_track::{LocalTrack, MediaHandle};
use meshcall_core::MediaConstraints;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

enum MediaSlot {
    Idle,
    Acquired(MediaHandle),
    Failed(MediaError),
    Released,
}

/// Owns local capture for one coordinator lifetime.
///
/// The platform is asked at most once: concurrent callers queue on the
/// acquisition gate and all observe the first outcome. After `release` the
/// session stays released; an acquisition that completes afterwards stops
/// its own tracks.
pub struct LocalMediaSession {
    gate: tokio::sync::Mutex<()>,
    slot: Mutex<MediaSlot>,
}

impl Default for LocalMediaSession {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalMediaSession {
    pub fn new() -> Self {
        Self {
            gate: tokio::sync::Mutex::new(()),
            slot: Mutex::new(MediaSlot::Idle),
        }
    }

    pub async fn acquire(
        &self,
        devices: &dyn MediaDevices,
        constraints: &MediaConstraints,
    ) -> Result<MediaHandle, MediaError> {
        let _gate = self.gate.lock().await;

        {
            let slot = self.slot.lock();
            match &*slot {
                MediaSlot::Acquired(handle) => return Ok(handle.clone()),
                MediaSlot::Failed(e) => return Err(e.clone()),
                MediaSlot::Released => return Err(MediaError::Released),
                MediaSlot::Idle => {}
            }
        }

        debug!("Opening capture devices: {:?}", constraints);
        let result = devices.open(constraints).await;

        let mut slot = self.slot.lock();
        if matches!(*slot, MediaSlot::Released) {
            if let Ok(handle) = result {
                warn!("Capture completed after release; stopping its tracks");
                handle.stop_all();
            }
            return Err(MediaError::Released);
        }

        match result {
            Ok(handle) => {
                info!("Local media acquired: {:?}", handle.kinds());
                *slot = MediaSlot::Acquired(handle.clone());
                Ok(handle)
            }
            Err(e) => {
                warn!("Local media unavailable: {}", e);
                *slot = MediaSlot::Failed(e.clone());
                Err(e)
            }
        }
    }

    /// Stops every track. Safe to call repeatedly.
    pub fn release(&self) {
        let previous = std::mem::replace(&mut *self.slot.lock(), MediaSlot::Released);
        if let MediaSlot::Acquired(handle) = previous {
            info!("Releasing {} local track(s)", handle.tracks().len());
            handle.stop_all();
        }
    }

    pub fn current(&self) -> Option<MediaHandle> {
        match &*self.slot.lock() {
            MediaSlot::Acquired(handle) => Some(handle.clone()),
            _ => None,
        }
    }

    /// Tracks to put on a new outgoing connection; empty without media.
    pub fn live_tracks(&self) -> Vec<LocalTrack> {
        self.current()
            .map(|handle| handle.live_tracks())
            .unwrap_or_default()
    }

    pub fn is_released(&self) -> bool {
        matches!(*self.slot.lock(), MediaSlot::Released)
    }
}

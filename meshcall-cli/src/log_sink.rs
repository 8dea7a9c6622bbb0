use async_trait::async_trait;
use dashmap::DashMap;
use meshcall_core::ParticipantId;
use meshcall_peer::{RemoteMedia, RenderSink};
use tokio::task::JoinHandle;
use tracing::{debug, info};

const REPORT_EVERY: u64 = 300;

/// Render sink for a terminal: reads inbound RTP and reports what arrives.
#[derive(Default)]
pub struct LogSink {
    readers: DashMap<ParticipantId, Vec<JoinHandle<()>>>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RenderSink for LogSink {
    async fn attach(&self, remote_id: &ParticipantId, media: RemoteMedia) {
        info!("▶ {} {} (track {})", remote_id, media.kind, media.track_id);

        let Some(track) = media.track else {
            return;
        };
        let remote = remote_id.clone();
        let kind = media.kind;
        let reader = tokio::spawn(async move {
            let mut packets = 0u64;
            while track.read_rtp().await.is_ok() {
                packets += 1;
                if packets % REPORT_EVERY == 0 {
                    debug!("{} {}: {} packets", remote, kind, packets);
                }
            }
            debug!("{} {} ended after {} packets", remote, kind, packets);
        });

        self.readers
            .entry(remote_id.clone())
            .or_default()
            .push(reader);
    }

    async fn detach(&self, remote_id: &ParticipantId) {
        if let Some((_, readers)) = self.readers.remove(remote_id) {
            for reader in readers {
                reader.abort();
            }
        }
        info!("■ {}", remote_id);
    }
}

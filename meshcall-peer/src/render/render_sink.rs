use crate::render::RemoteMedia;
use async_trait::async_trait;
use meshcall_core::ParticipantId;

/// Binds inbound media to whatever displays it. The mesh never touches
/// display surfaces directly.
#[async_trait]
pub trait RenderSink: Send + Sync {
    /// Called for each inbound track of a remote.
    async fn attach(&self, remote_id: &ParticipantId, media: RemoteMedia);

    /// Called once when the link to `remote_id` is removed.
    async fn detach(&self, remote_id: &ParticipantId);
}

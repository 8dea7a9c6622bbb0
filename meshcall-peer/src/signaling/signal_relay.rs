use crate::error::RelayError;
use async_trait::async_trait;
use meshcall_core::SignalEnvelope;

/// Outbound half of the relay: delivers an envelope to `envelope.target`.
/// Inbound messages reach the mesh as commands.
#[async_trait]
pub trait SignalRelay: Send + Sync {
    async fn send(&self, envelope: SignalEnvelope) -> Result<(), RelayError>;
}

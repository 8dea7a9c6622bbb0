use meshcall_core::utils::default_ice_servers;
use meshcall_core::{IceServerConfig, MediaKind};
use serde::{Deserialize, Serialize};

/// Settings for every native peer connection the mesh opens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub ice_servers: Vec<IceServerConfig>,
    /// Kinds the initiator asks to receive even without a local track.
    pub receive_only: Vec<MediaKind>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: default_ice_servers(),
            receive_only: Vec::new(),
        }
    }
}

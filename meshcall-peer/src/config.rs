use crate::transport::TransportConfig;
use meshcall_core::{MediaConstraints, Role};
use serde::{Deserialize, Serialize};

/// Everything the coordinator needs besides its collaborators.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    pub transport: TransportConfig,
    pub media: MediaConstraints,
    /// Roles kept out of the mesh (e.g. a camera-less host).
    pub excluded_roles: Vec<Role>,
}

impl MeshConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn excluding(mut self, role: Role) -> Self {
        if !self.excluded_roles.contains(&role) {
            self.excluded_roles.push(role);
        }
        self
    }
}

mod link_role;
mod peer_link;
mod peer_state;

pub use link_role::*;
pub use peer_link::*;
pub use peer_state::*;

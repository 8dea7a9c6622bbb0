mod config;
mod coordinator;
mod error;
mod media;
mod peer;
mod render;
mod signaling;
mod transport;

pub use config::*;
pub use coordinator::*;
pub use error::*;
pub use media::*;
pub use peer::*;
pub use render::*;
pub use signaling::*;
pub use transport::*;

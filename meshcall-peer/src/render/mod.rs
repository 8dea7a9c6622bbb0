mod remote_media;
mod render_sink;

pub use remote_media::*;
pub use render_sink::*;

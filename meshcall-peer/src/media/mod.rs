mod devices;
mod local_media;
mod local_track;

pub use devices::*;
pub use local_media::*;
pub use local_track::*;

mod signal_relay;
mod ws_relay;

pub use signal_relay::*;
pub use ws_relay::*;

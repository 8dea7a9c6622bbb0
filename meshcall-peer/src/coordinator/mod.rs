mod coordinator_command;
mod mesh_coordinator;
mod mesh_event;
mod mesh_handle;
mod mesh_view;

pub use coordinator_command::*;
pub use mesh_coordinator::*;
pub use mesh_event::*;
pub use mesh_handle::*;
pub use mesh_view::*;

mod batch;
mod replay_buffer;
mod window;

pub use batch::Batch;
pub use replay_buffer::{ReplayBuffer, Transition};
pub use window::Window;

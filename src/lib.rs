//! Fixed-capacity experience replay for reinforcement-learning agents.
//!
//! [`ReplayBuffer`] keeps the last `buffer_size` transitions for uniform
//! mini-batch sampling and the last `episode_steps` transitions for in-order
//! retrieval, and stacks whatever it selects into burn tensors on the
//! configured device.

pub mod buffer;
pub mod config;
pub mod error;

pub use buffer::{Batch, ReplayBuffer, Transition, Window};
pub use config::ReplayConfig;
pub use error::{ConfigError, ReplayError};

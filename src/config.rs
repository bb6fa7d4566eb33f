use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Sizing and seeding for a [`ReplayBuffer`](crate::ReplayBuffer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Transitions per random sample.
    pub batch_size: usize,
    /// Main window capacity.
    pub buffer_size: usize,
    /// Episode window capacity.
    pub episode_steps: usize,
    /// Seeds the sampling rng. `None` seeds from system entropy.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            batch_size: 64,
            buffer_size: 10_000,
            episode_steps: 1_000,
            random_seed: None,
        }
    }
}

impl ReplayConfig {
    pub fn new(batch_size: usize, buffer_size: usize, episode_steps: usize) -> Self {
        Self { batch_size, buffer_size, episode_steps, random_seed: None }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_episode_steps(mut self, episode_steps: usize) -> Self {
        self.episode_steps = episode_steps;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Parses a JSON object. The three sizes are required; `random_seed` may be
    /// missing or `null`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size"));
        }
        if self.buffer_size == 0 {
            return Err(ConfigError::Invalid("buffer_size"));
        }
        if self.episode_steps == 0 {
            return Err(ConfigError::Invalid("episode_steps"));
        }
        Ok(())
    }
}

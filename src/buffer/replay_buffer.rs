use burn::tensor::backend::Backend;
use log::{debug, trace};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;

use crate::buffer::{Batch, Window};
use crate::config::ReplayConfig;
use crate::error::ReplayError;

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: Vec<f32>,
    pub action: Vec<f32>,
    pub reward: f32,
    pub next_state: Vec<f32>,
    pub done: bool,
}

impl Transition {
    pub fn new(
        state: Vec<f32>,
        action: Vec<f32>,
        reward: f32,
        next_state: Vec<f32>,
        done: bool,
    ) -> Self {
        Self { state, action, reward, next_state, done }
    }
}

/// Fixed-capacity experience store.
///
/// Every transition goes into two rings: the main window (`buffer_size`),
/// sampled uniformly without replacement, and the episode window
/// (`episode_steps`), returned whole and in insertion order. The episode
/// window knows nothing about episode boundaries; it is simply the last
/// `episode_steps` transitions added.
///
/// There is no internal locking. Callers sharing a buffer between threads
/// must serialize `add` and `sample` themselves.
pub struct ReplayBuffer<B: Backend> {
    memory: Window<Transition>,
    episode_memory: Window<Transition>,
    batch_size: usize,
    rng: StdRng,
    device: B::Device,
}

impl<B: Backend> ReplayBuffer<B> {
    pub fn new(device: B::Device, config: &ReplayConfig) -> Self {
        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        debug!(
            "replay buffer: capacity={} episode_steps={} batch_size={} seed={:?}",
            config.buffer_size, config.episode_steps, config.batch_size, config.random_seed
        );
        Self {
            memory: Window::new(config.buffer_size),
            episode_memory: Window::new(config.episode_steps),
            batch_size: config.batch_size,
            rng,
            device,
        }
    }

    pub fn add(
        &mut self,
        state: Vec<f32>,
        action: Vec<f32>,
        reward: f32,
        next_state: Vec<f32>,
        done: bool,
    ) {
        self.push(Transition::new(state, action, reward, next_state, done));
    }

    pub fn push(&mut self, transition: Transition) {
        self.episode_memory.push(transition.clone());
        if self.memory.push(transition).is_some() {
            trace!("replay buffer full, evicted oldest transition");
        }
    }

    /// Draws a batch on the configured device.
    ///
    /// With `best_episode` the whole episode window is returned in insertion
    /// order and `batch_size` is ignored. Otherwise exactly `batch_size`
    /// distinct transitions are drawn from the main window.
    pub fn sample(&mut self, best_episode: bool) -> Result<Batch<B>, ReplayError> {
        let transitions = self.sample_transitions(best_episode)?;
        Batch::from_transitions(&transitions, &self.device)
    }

    /// Like [`sample`](Self::sample), without the tensor conversion.
    pub fn sample_transitions(&mut self, best_episode: bool) -> Result<Vec<Transition>, ReplayError> {
        if best_episode {
            debug!("sampling episode window of {} transitions", self.episode_memory.len());
            return Ok(self.episode_memory.iter().cloned().collect());
        }

        let available = self.memory.len();
        if available < self.batch_size {
            return Err(ReplayError::InsufficientSamples { requested: self.batch_size, available });
        }
        let indices = index::sample(&mut self.rng, available, self.batch_size);
        debug!("sampled {} of {} transitions", indices.len(), available);
        Ok(indices
            .iter()
            .filter_map(|i| self.memory.get(i).cloned())
            .collect())
    }

    /// Transitions in the main window.
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    pub fn episode_len(&self) -> usize {
        self.episode_memory.len()
    }

    pub fn can_sample(&self) -> bool {
        self.memory.len() >= self.batch_size
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn capacity(&self) -> usize {
        self.memory.capacity()
    }

    pub fn episode_capacity(&self) -> usize {
        self.episode_memory.capacity()
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use proptest::prelude::*;
    use std::collections::HashSet;

    type TestBackend = NdArray<f32>;

    fn transition(id: usize) -> Transition {
        let x = id as f32;
        Transition::new(vec![x, x * 10.0], vec![x], x * 0.1, vec![x + 1.0, (x + 1.0) * 10.0], id % 2 == 0)
    }

    fn buffer(batch_size: usize, buffer_size: usize, episode_steps: usize) -> ReplayBuffer<TestBackend> {
        let config = ReplayConfig::new(batch_size, buffer_size, episode_steps).with_random_seed(42);
        ReplayBuffer::new(Default::default(), &config)
    }

    fn ids(transitions: &[Transition]) -> Vec<usize> {
        transitions.iter().map(|t| t.state[0] as usize).collect()
    }

    #[test]
    fn test_new_buffer_is_empty() {
        let mut buffer = buffer(2, 4, 3);
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.episode_len(), 0);
        assert!(!buffer.can_sample());
        assert!(matches!(buffer.sample(true), Err(ReplayError::EmptyBatch)));
    }

    #[test]
    fn test_add_grows_until_capacity() {
        let mut buffer = buffer(2, 3, 2);
        for id in 1..=5 {
            buffer.push(transition(id));
            assert_eq!(buffer.len(), id.min(3));
            assert_eq!(buffer.episode_len(), id.min(2));
        }
        assert_eq!(buffer.capacity(), 3);
        assert_eq!(buffer.episode_capacity(), 2);
    }

    #[test]
    fn test_add_takes_fields() {
        let mut buffer = buffer(1, 2, 2);
        buffer.add(vec![1.0], vec![2.0], 3.0, vec![4.0], true);
        let sampled = buffer.sample_transitions(true).unwrap();
        assert_eq!(sampled, vec![Transition::new(vec![1.0], vec![2.0], 3.0, vec![4.0], true)]);
    }

    #[test]
    fn test_episode_window_ignores_batch_size() {
        let mut buffer = buffer(5, 10, 3);
        for id in 1..=2 {
            buffer.push(transition(id));
        }
        let batch = buffer.sample(true).unwrap();
        assert_eq!(batch.len(), 2);
        assert!(buffer.sample(false).is_err());
    }

    #[test]
    fn test_underflow_leaves_buffer_unchanged() {
        let mut buffer = buffer(3, 5, 5);
        buffer.push(transition(1));
        buffer.push(transition(2));
        match buffer.sample(false) {
            Err(ReplayError::InsufficientSamples { requested, available }) => {
                assert_eq!(requested, 3);
                assert_eq!(available, 2);
            }
            other => panic!("expected underflow, got {other:?}"),
        }
        assert_eq!(buffer.len(), 2);
        assert_eq!(ids(&buffer.sample_transitions(true).unwrap()), vec![1, 2]);
    }

    #[test]
    fn test_exact_fill_samples_every_transition() {
        let mut buffer = buffer(4, 4, 4);
        for id in 1..=4 {
            buffer.push(transition(id));
        }
        let mut sampled = ids(&buffer.sample_transitions(false).unwrap());
        sampled.sort_unstable();
        assert_eq!(sampled, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_entropy_seeded_buffer_samples() {
        let config = ReplayConfig::new(2, 8, 8);
        let mut buffer = ReplayBuffer::<TestBackend>::new(Default::default(), &config);
        for id in 0..8 {
            buffer.push(transition(id));
        }
        assert_eq!(buffer.sample(false).unwrap().len(), 2);
    }

    proptest! {
        #[test]
        fn prop_windows_keep_most_recent(
            buffer_size in 1usize..12,
            episode_steps in 1usize..12,
            n in 0usize..40,
        ) {
            let mut buffer = buffer(1, buffer_size, episode_steps);
            for id in 0..n {
                buffer.push(transition(id));
            }
            prop_assert_eq!(buffer.len(), n.min(buffer_size));
            prop_assert_eq!(buffer.episode_len(), n.min(episode_steps));

            let episode = buffer.sample_transitions(true).unwrap();
            let expected: Vec<usize> = (n - n.min(episode_steps)..n).collect();
            prop_assert_eq!(ids(&episode), expected);
        }

        #[test]
        fn prop_random_draws_are_distinct_and_retained(
            batch_size in 1usize..8,
            buffer_size in 8usize..16,
            n in 8usize..40,
        ) {
            let mut buffer = buffer(batch_size, buffer_size, 4);
            for id in 0..n {
                buffer.push(transition(id));
            }
            let sampled = ids(&buffer.sample_transitions(false).unwrap());
            prop_assert_eq!(sampled.len(), batch_size);
            let unique: HashSet<usize> = sampled.iter().copied().collect();
            prop_assert_eq!(unique.len(), batch_size);
            let oldest = n - n.min(buffer_size);
            prop_assert!(sampled.iter().all(|id| (oldest..n).contains(id)));
        }
    }
}

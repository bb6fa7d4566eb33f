use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use burn::backend::{NdArray, ndarray::NdArrayDevice};
use experience_replay::{ReplayBuffer, ReplayConfig, ReplayError, Transition};
use flume::{Receiver, Sender};
use log::{error, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

type Backend = NdArray<f32>;

const STATE_DIM: usize = 4;
const MAX_EPISODE_STEPS: usize = 200;
const TOTAL_STEPS: usize = 5_000;
const SAMPLE_EVERY: usize = 250;

fn load_config() -> Result<ReplayConfig, Box<dyn std::error::Error + Send + Sync>> {
    let config = match std::env::args().nth(1) {
        Some(path) => ReplayConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => ReplayConfig::default().with_random_seed(42),
    };
    config.validate()?;
    Ok(config)
}

/// Noisy walk of a point pushed by a scalar action. The episode ends when the
/// point leaves the unit box or runs out of steps.
fn run_producer(tx: Sender<Transition>, stop: Arc<AtomicBool>, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut state = [0.0f32; STATE_DIM];
    let mut steps = 0;

    while !stop.load(Ordering::Relaxed) {
        let action: f32 = rng.gen_range(-1.0..1.0);
        let mut next_state = state;
        for x in next_state.iter_mut() {
            *x += 0.1 * action + rng.gen_range(-0.05..0.05);
        }
        steps += 1;

        let escaped = next_state.iter().any(|x| x.abs() > 1.0);
        let done = escaped || steps >= MAX_EPISODE_STEPS;
        let reward = if escaped { 0.0 } else { 1.0 };

        let transition =
            Transition::new(state.to_vec(), vec![action], reward, next_state.to_vec(), done);
        if tx.send(transition).is_err() {
            break;
        }

        if done {
            state = [0.0; STATE_DIM];
            steps = 0;
        } else {
            state = next_state;
        }
    }
}

fn run_consumer(
    rx: Receiver<Transition>,
    stop: &AtomicBool,
    config: &ReplayConfig,
) -> Result<(), ReplayError> {
    let mut buffer: ReplayBuffer<Backend> = ReplayBuffer::new(NdArrayDevice::default(), config);
    let mut steps = 0;
    let mut episodes = 0;

    while steps < TOTAL_STEPS {
        let Ok(transition) = rx.recv() else {
            break;
        };
        if transition.done {
            episodes += 1;
        }
        buffer.push(transition);
        steps += 1;

        if steps % SAMPLE_EVERY == 0 && buffer.can_sample() {
            let batch = buffer.sample(false)?;
            let mean_reward: f32 = batch.rewards.clone().mean().into_scalar();
            let done_rate: f32 = batch.dones.clone().mean().into_scalar();
            info!(
                "step {steps}: stored={} episodes={episodes} batch={} mean_reward={mean_reward:.3} done_rate={done_rate:.3}",
                buffer.len(),
                batch.len(),
            );
        }
    }
    stop.store(true, Ordering::Relaxed);

    let (states, actions, rewards, next_states, dones) = buffer.sample(true)?.into_parts();
    info!(
        "latest episode window: states={:?} actions={:?} rewards={:?} next_states={:?} dones={:?}",
        states.dims(),
        actions.dims(),
        rewards.dims(),
        next_states.dims(),
        dones.dims(),
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let (tx, rx) = flume::bounded::<Transition>(256);
    let stop = Arc::new(AtomicBool::new(false));
    let stop_clone = stop.clone();
    let seed = config.random_seed.unwrap_or_default().wrapping_add(1);
    let handle = std::thread::spawn(move || run_producer(tx, stop_clone, seed));

    if let Err(e) = run_consumer(rx, &stop, &config) {
        error!("replay demo failed: {e}");
    }

    stop.store(true, Ordering::Relaxed);
    let _ = handle.join();
}

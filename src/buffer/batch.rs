use burn::tensor::{Int, Tensor, backend::Backend};

use crate::buffer::Transition;
use crate::error::ReplayError;

/// Field-wise stack of transitions, each tensor with the batch on axis 0.
#[derive(Debug, Clone)]
pub struct Batch<B: Backend> {
    pub states: Tensor<B, 2>,
    pub actions: Tensor<B, 2>,
    pub rewards: Tensor<B, 2>,
    pub next_states: Tensor<B, 2>,
    pub dones: Tensor<B, 2>,
}

impl<B: Backend> Batch<B> {
    /// Stacks `transitions` in the order given.
    ///
    /// Vector fields must all have the length of the first transition's.
    /// Rewards and dones become `[n, 1]` columns; dones pass through a `u8`
    /// int tensor so they land on exactly 0.0 and 1.0.
    pub fn from_transitions<'a, I>(transitions: I, device: &B::Device) -> Result<Self, ReplayError>
    where
        I: IntoIterator<Item = &'a Transition>,
    {
        let transitions: Vec<&Transition> = transitions.into_iter().collect();
        if transitions.is_empty() {
            return Err(ReplayError::EmptyBatch);
        }
        let batch_size = transitions.len();

        let states = stack_rows(&transitions, "state", |t| t.state.as_slice(), device)?;
        let actions = stack_rows(&transitions, "action", |t| t.action.as_slice(), device)?;
        let next_states =
            stack_rows(&transitions, "next_state", |t| t.next_state.as_slice(), device)?;

        let rewards: Vec<f32> = transitions.iter().map(|t| t.reward).collect();
        let rewards_tensor: Tensor<B, 2> =
            Tensor::<B, 1>::from_floats(rewards.as_slice(), device).reshape([batch_size, 1]);

        let dones: Vec<u8> = transitions.iter().map(|t| u8::from(t.done)).collect();
        let dones_tensor: Tensor<B, 2> =
            Tensor::<B, 1, Int>::from_ints(dones.as_slice(), device)
                .reshape([batch_size, 1])
                .float();

        Ok(Self {
            states,
            actions,
            rewards: rewards_tensor,
            next_states,
            dones: dones_tensor,
        })
    }

    /// Number of transitions in the batch.
    pub fn len(&self) -> usize {
        self.states.dims()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(states, actions, rewards, next_states, dones)`
    pub fn into_parts(
        self,
    ) -> (Tensor<B, 2>, Tensor<B, 2>, Tensor<B, 2>, Tensor<B, 2>, Tensor<B, 2>) {
        (self.states, self.actions, self.rewards, self.next_states, self.dones)
    }
}

fn stack_rows<B: Backend>(
    transitions: &[&Transition],
    field: &'static str,
    row: fn(&Transition) -> &[f32],
    device: &B::Device,
) -> Result<Tensor<B, 2>, ReplayError> {
    let width = row(transitions[0]).len();
    let mut flat: Vec<f32> = Vec::with_capacity(width * transitions.len());
    for (index, transition) in transitions.iter().enumerate() {
        let values = row(transition);
        if values.len() != width {
            return Err(ReplayError::ShapeMismatch {
                field,
                index,
                expected: width,
                found: values.len(),
            });
        }
        flat.extend_from_slice(values);
    }
    Ok(Tensor::<B, 1>::from_floats(flat.as_slice(), device).reshape([transitions.len(), width]))
}

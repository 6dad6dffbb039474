use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

use crate::error::{DdpgError, Result};

/// One step of experience
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub state: Array1<f32>,
    pub action: Array1<f32>,
    pub reward: f32,
    pub next_state: Array1<f32>,
    pub done: bool,
}

/// A sampled batch split into index-aligned columns, one row per transition
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionBatch {
    pub states: Array2<f32>,
    pub actions: Array2<f32>,
    /// Shape `(batch, 1)`
    pub rewards: Array2<f32>,
    pub next_states: Array2<f32>,
    /// Shape `(batch, 1)`, `1.0` where the episode ended
    pub dones: Array2<f32>,
}

impl TransitionBatch {
    /// Stack transitions row by row. All rows must share state and action widths.
    pub fn from_transitions(transitions: &[&Transition]) -> Result<Self> {
        let first = transitions.first().ok_or(DdpgError::InsufficientData {
            requested: 1,
            available: 0,
        })?;
        let batch_size = transitions.len();
        let state_size = first.state.len();
        let action_size = first.action.len();

        let mut states = Array2::zeros((batch_size, state_size));
        let mut actions = Array2::zeros((batch_size, action_size));
        let mut rewards = Array2::zeros((batch_size, 1));
        let mut next_states = Array2::zeros((batch_size, state_size));
        let mut dones = Array2::zeros((batch_size, 1));

        for (i, t) in transitions.iter().enumerate() {
            if t.state.len() != state_size || t.next_state.len() != state_size || t.action.len() != action_size {
                return Err(DdpgError::shape_mismatch(
                    format!("state {} / action {}", state_size, action_size),
                    format!(
                        "state {} / next_state {} / action {} in row {}",
                        t.state.len(),
                        t.next_state.len(),
                        t.action.len(),
                        i
                    ),
                ));
            }
            states.row_mut(i).assign(&t.state);
            actions.row_mut(i).assign(&t.action);
            rewards[[i, 0]] = t.reward;
            next_states.row_mut(i).assign(&t.next_state);
            dones[[i, 0]] = if t.done { 1.0 } else { 0.0 };
        }

        Ok(TransitionBatch { states, actions, rewards, next_states, dones })
    }

    pub fn len(&self) -> usize {
        self.states.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fixed-capacity experience store. Once full, each insert evicts the oldest transition.
#[derive(Clone, Debug)]
pub struct ReplayBuffer {
    buffer: VecDeque<Transition>,
    capacity: usize,
    rng: ChaCha8Rng,
}

impl ReplayBuffer {
    pub fn new(capacity: usize, seed: u64) -> Result<Self> {
        if capacity == 0 {
            return Err(DdpgError::invalid_parameter("buffer_size", "capacity must be greater than 0"));
        }
        Ok(ReplayBuffer {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    pub fn add(&mut self, transition: Transition) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(transition);
    }

    pub fn add_experience(
        &mut self,
        state: Array1<f32>,
        action: Array1<f32>,
        reward: f32,
        next_state: Array1<f32>,
        done: bool,
    ) {
        self.add(Transition { state, action, reward, next_state, done });
    }

    pub fn extend<I: IntoIterator<Item = Transition>>(&mut self, transitions: I) {
        for transition in transitions {
            self.add(transition);
        }
    }

    /// Draw `batch_size` distinct transitions uniformly at random.
    pub fn sample_transitions(&mut self, batch_size: usize) -> Result<Vec<&Transition>> {
        if batch_size == 0 {
            return Err(DdpgError::invalid_parameter("batch_size", "must be greater than 0"));
        }
        if self.buffer.len() < batch_size {
            return Err(DdpgError::InsufficientData {
                requested: batch_size,
                available: self.buffer.len(),
            });
        }
        let indices: Vec<usize> = (0..self.buffer.len())
            .collect::<Vec<_>>()
            .choose_multiple(&mut self.rng, batch_size)
            .cloned()
            .collect();
        Ok(indices.into_iter().map(|i| &self.buffer[i]).collect())
    }

    /// Sample and split into aligned columns.
    pub fn sample(&mut self, batch_size: usize) -> Result<TransitionBatch> {
        let transitions = self.sample_transitions(batch_size)?;
        TransitionBatch::from_transitions(&transitions)
    }

    /// Stored transitions, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.buffer.iter()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

//! The simulator the agent acts in.
//!
//! The agent only ever calls `reset` at episode start and `step` once per control-loop
//! iteration, synchronously.

use ndarray::{Array1, ArrayView1};

use crate::error::Result;

/// Result of one environment step
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub next_state: Array1<f32>,
    pub reward: f32,
    /// Episode ended (terminal state or time limit)
    pub done: bool,
}

impl StepOutcome {
    pub fn new(next_state: Array1<f32>, reward: f32, done: bool) -> Self {
        StepOutcome { next_state, reward, done }
    }
}

/// A continuous-action environment.
pub trait Environment {
    /// Width of the state vector
    fn state_size(&self) -> usize;

    /// Width of the action vector
    fn action_size(&self) -> usize;

    /// Start a new episode and return its first state.
    fn reset(&mut self) -> Result<Array1<f32>>;

    /// Apply `action` and advance one step.
    fn step(&mut self, action: ArrayView1<f32>) -> Result<StepOutcome>;
}

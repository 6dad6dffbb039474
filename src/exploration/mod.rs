//! # Exploration Strategies
//!
//! A deterministic policy never tries anything new on its own, so the agent perturbs the
//! actor's output before acting. The perturbation is stateful within an episode and is
//! reset at episode start.

pub mod ou_noise;

use ndarray::{Array1, ArrayView1};

use crate::error::Result;

pub use ou_noise::{OrnsteinUhlenbeckNoise, OuNoiseExploration};

/// Turns the actor's action into the action actually taken.
pub trait ExplorationStrategy {
    fn perturb_action(&mut self, action: ArrayView1<f32>) -> Result<Array1<f32>>;

    /// Called at the start of every episode
    fn reset(&mut self);
}

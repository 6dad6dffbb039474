use ndarray::Array1;
use serde::{Serialize, Deserialize};

/// Mutable bookkeeping the control loop threads through each iteration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeState {
    pub state: Array1<f32>,
    pub next_state: Array1<f32>,
    /// Action taken in `state`, exploration noise included
    pub action: Array1<f32>,
    /// Reward as stored in the replay buffer (after optional clipping)
    pub reward: f32,
    pub done: bool,
    /// Steps taken across all episodes
    pub global_step_number: usize,
    /// Episodes completed
    pub episode_number: usize,
    /// Steps taken in the current episode
    pub episode_step_number: usize,
    /// Unclipped reward collected in the current episode
    pub total_episode_reward: f32,
}

impl EpisodeState {
    /// Clear per-episode fields and start from `initial_state`. Counters carry over.
    pub fn begin_episode(&mut self, initial_state: Array1<f32>) {
        self.state = initial_state;
        self.next_state = Array1::zeros(0);
        self.action = Array1::zeros(0);
        self.reward = 0.0;
        self.done = false;
        self.episode_step_number = 0;
        self.total_episode_reward = 0.0;
    }

    /// Move to the next state and count the step.
    pub fn advance(&mut self) {
        std::mem::swap(&mut self.state, &mut self.next_state);
        self.global_step_number += 1;
        self.episode_step_number += 1;
    }
}

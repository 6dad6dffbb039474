use std::collections::VecDeque;
use serde::{Serialize, Deserialize};

/// Episodes averaged into the rolling score
pub const ROLLING_SCORE_WINDOW: usize = 100;

/// Stores training metrics over time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingMetrics {
    /// Critic MSE per applied update
    pub critic_losses: VecDeque<f32>,

    /// Actor loss (negated mean Q) per applied update
    pub actor_losses: VecDeque<f32>,

    /// Pre-clip critic gradient norms
    pub critic_gradient_norms: VecDeque<f32>,

    /// Pre-clip actor gradient norms
    pub actor_gradient_norms: VecDeque<f32>,

    /// Actor learning rate after each refresh
    pub actor_learning_rates: VecDeque<f32>,

    /// Total reward per episode
    pub episode_rewards: VecDeque<f32>,

    /// Steps per episode
    pub episode_lengths: VecDeque<usize>,

    /// Rolling mean reward after each episode
    pub rolling_scores: VecDeque<f32>,
}

/// Tracks metrics during training
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsTracker {
    metrics: TrainingMetrics,
    history_size: usize,
    episode_count: usize,
    skipped_updates: usize,
    max_episode_reward: Option<f32>,
    max_rolling_score: Option<f32>,
}

fn push_bounded<T>(queue: &mut VecDeque<T>, value: T, limit: usize) {
    if queue.len() >= limit {
        queue.pop_front();
    }
    queue.push_back(value);
}

impl MetricsTracker {
    pub fn new(history_size: usize) -> Self {
        MetricsTracker {
            metrics: TrainingMetrics::default(),
            history_size: history_size.max(ROLLING_SCORE_WINDOW),
            episode_count: 0,
            skipped_updates: 0,
            max_episode_reward: None,
            max_rolling_score: None,
        }
    }

    /// Record an applied critic update
    pub fn record_critic_update(&mut self, loss: f32, gradient_norm: f32) {
        push_bounded(&mut self.metrics.critic_losses, loss, self.history_size);
        push_bounded(&mut self.metrics.critic_gradient_norms, gradient_norm, self.history_size);
    }

    /// Record an applied actor update
    pub fn record_actor_update(&mut self, loss: f32, gradient_norm: f32) {
        push_bounded(&mut self.metrics.actor_losses, loss, self.history_size);
        push_bounded(&mut self.metrics.actor_gradient_norms, gradient_norm, self.history_size);
    }

    pub fn record_learning_rate(&mut self, learning_rate: f32) {
        push_bounded(&mut self.metrics.actor_learning_rates, learning_rate, self.history_size);
    }

    /// Record an update dropped for numerical instability
    pub fn record_skipped_update(&mut self) {
        self.skipped_updates += 1;
    }

    /// Record a finished episode and refresh the rolling score
    pub fn end_episode(&mut self, reward: f32, length: usize) {
        self.episode_count += 1;
        push_bounded(&mut self.metrics.episode_rewards, reward, self.history_size);
        push_bounded(&mut self.metrics.episode_lengths, length, self.history_size);

        let window = self.metrics.episode_rewards.len().min(ROLLING_SCORE_WINDOW);
        let rolling = self.metrics.episode_rewards.iter().rev().take(window).sum::<f32>() / window as f32;
        push_bounded(&mut self.metrics.rolling_scores, rolling, self.history_size);

        self.max_episode_reward = Some(self.max_episode_reward.map_or(reward, |m| m.max(reward)));
        self.max_rolling_score = Some(self.max_rolling_score.map_or(rolling, |m| m.max(rolling)));
    }

    pub fn rolling_score(&self) -> Option<f32> {
        self.metrics.rolling_scores.back().copied()
    }

    pub fn max_episode_reward(&self) -> Option<f32> {
        self.max_episode_reward
    }

    pub fn max_rolling_score(&self) -> Option<f32> {
        self.max_rolling_score
    }

    pub fn episode_count(&self) -> usize {
        self.episode_count
    }

    pub fn skipped_updates(&self) -> usize {
        self.skipped_updates
    }

    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }
}

impl Default for MetricsTracker {
    fn default() -> Self {
        Self::new(1000)
    }
}

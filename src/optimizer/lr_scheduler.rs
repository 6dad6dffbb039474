use serde::{Serialize, Deserialize};

/// What a schedule may look at when picking the next learning rate
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScheduleProgress {
    /// Episodes completed so far
    pub episode_number: usize,
    /// Mean reward of the most recent episodes, once any have finished
    pub rolling_score: Option<f32>,
}

/// Learning rate scheduling strategies, relative to a starting learning rate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum LearningRateScheduler {
    /// Keep the starting learning rate
    #[default]
    Constant,

    /// Step decay: lr = starting_lr * decay_rate^(episode / step_size)
    StepDecay {
        decay_rate: f32,
        step_size: usize,
    },

    /// Exponential decay: lr = starting_lr * decay_rate^episode
    ExponentialDecay {
        decay_rate: f32,
    },

    /// Cosine annealing from starting_lr down to min_lr over each period
    CosineAnnealing {
        min_lr: f32,
        period: usize,
    },

    /// Shrink the rate as the rolling score approaches the score that solves the task:
    /// above 75% divide by 100, above 60% by 20, above 50% by 10, above 25% by 2.
    RollingScore {
        score_required_to_win: f32,
    },
}

impl LearningRateScheduler {
    /// Get the learning rate for the given progress
    pub fn learning_rate(&self, starting_lr: f32, progress: &ScheduleProgress) -> f32 {
        let episode = progress.episode_number;

        match self {
            LearningRateScheduler::Constant => starting_lr,

            LearningRateScheduler::StepDecay { decay_rate, step_size } => {
                let num_decays = (episode / (*step_size).max(1)) as f32;
                starting_lr * decay_rate.powf(num_decays)
            }

            LearningRateScheduler::ExponentialDecay { decay_rate } => {
                starting_lr * decay_rate.powf(episode as f32)
            }

            LearningRateScheduler::CosineAnnealing { min_lr, period } => {
                let period = (*period).max(1);
                let progress = (episode % period) as f32 / period as f32;
                min_lr + 0.5 * (starting_lr - min_lr) * (1.0 + (std::f32::consts::PI * progress).cos())
            }

            LearningRateScheduler::RollingScore { score_required_to_win } => {
                let score = match progress.rolling_score {
                    Some(score) => score,
                    None => return starting_lr,
                };
                if score > 0.75 * score_required_to_win {
                    starting_lr / 100.0
                } else if score > 0.6 * score_required_to_win {
                    starting_lr / 20.0
                } else if score > 0.5 * score_required_to_win {
                    starting_lr / 10.0
                } else if score > 0.25 * score_required_to_win {
                    starting_lr / 2.0
                } else {
                    starting_lr
                }
            }
        }
    }

    /// Create a step decay scheduler
    pub fn step_decay(decay_rate: f32, step_size: usize) -> Self {
        LearningRateScheduler::StepDecay { decay_rate, step_size }
    }

    /// Create a rolling-score scheduler
    pub fn rolling_score(score_required_to_win: f32) -> Self {
        LearningRateScheduler::RollingScore { score_required_to_win }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_episode(episode_number: usize) -> ScheduleProgress {
        ScheduleProgress { episode_number, rolling_score: None }
    }

    #[test]
    fn test_constant_never_decays() {
        let schedule = LearningRateScheduler::Constant;
        assert_eq!(schedule.learning_rate(1e-3, &at_episode(0)), 1e-3);
        assert_eq!(schedule.learning_rate(1e-3, &at_episode(500)), 1e-3);
    }

    #[test]
    fn test_step_decay() {
        let schedule = LearningRateScheduler::step_decay(0.5, 10);
        assert_eq!(schedule.learning_rate(1.0, &at_episode(9)), 1.0);
        assert_eq!(schedule.learning_rate(1.0, &at_episode(25)), 0.25);
    }

    #[test]
    fn test_rolling_score_thresholds() {
        let schedule = LearningRateScheduler::rolling_score(100.0);
        let with_score = |s: f32| ScheduleProgress { episode_number: 3, rolling_score: Some(s) };
        assert_eq!(schedule.learning_rate(1.0, &at_episode(3)), 1.0);
        assert_eq!(schedule.learning_rate(1.0, &with_score(10.0)), 1.0);
        assert_eq!(schedule.learning_rate(1.0, &with_score(30.0)), 0.5);
        assert_eq!(schedule.learning_rate(1.0, &with_score(55.0)), 0.1);
        assert_eq!(schedule.learning_rate(1.0, &with_score(70.0)), 0.05);
        assert_eq!(schedule.learning_rate(1.0, &with_score(90.0)), 0.01);
    }
}

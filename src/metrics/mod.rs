pub mod tracker;

pub use tracker::{MetricsTracker, TrainingMetrics, ROLLING_SCORE_WINDOW};

use ndarray::{Array2, ArrayView2};

/// Trait defining the interface for loss functions over batches
pub trait Loss: Send + Sync {
    /// Compute the loss for a batch of predictions and targets
    fn compute_batch(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> f32;

    /// Compute the gradient of the loss with respect to predictions
    fn gradient_batch(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> Array2<f32>;
}

/// Mean squared error, averaged over every element: `mean((p - t)^2)`
pub struct MeanSquaredError;

impl Loss for MeanSquaredError {
    fn compute_batch(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> f32 {
        let diff = &predictions - &targets;
        (&diff * &diff).sum() / predictions.len().max(1) as f32
    }

    fn gradient_batch(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> Array2<f32> {
        (&predictions - &targets) * (2.0 / predictions.len().max(1) as f32)
    }
}

/// Deterministic policy loss: `-mean(q_values)`.
pub fn actor_loss(q_values: ArrayView2<f32>) -> f32 {
    -q_values.mean().unwrap_or(0.0)
}

/// Gradient of [`actor_loss`] with respect to each Q-value.
pub fn actor_loss_gradient(q_values: ArrayView2<f32>) -> Array2<f32> {
    Array2::from_elem(q_values.dim(), -1.0 / q_values.len().max(1) as f32)
}

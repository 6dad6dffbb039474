use serde::{Serialize, Deserialize};

use crate::network::Gradients;

/// Gradient clipping methods
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum GradientClipper {
    /// Clip every gradient element into `[min, max]`
    ClipByValue { min: f32, max: f32 },

    /// Rescale all gradients together so their global L2 norm is at most `max_norm`
    ClipByGlobalNorm { max_norm: f32 },

    /// No clipping
    None,
}

/// How a network's `gradient_clipping_norm` is applied
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum ClippingMode {
    /// Rescale so the global L2 norm is at most the threshold
    #[default]
    GlobalNorm,
    /// Clamp every element into `[-threshold, threshold]`
    Value,
    None,
}

impl ClippingMode {
    pub fn clipper(&self, threshold: f32) -> GradientClipper {
        match self {
            ClippingMode::GlobalNorm => GradientClipper::ClipByGlobalNorm { max_norm: threshold },
            ClippingMode::Value => GradientClipper::ClipByValue { min: -threshold, max: threshold },
            ClippingMode::None => GradientClipper::None,
        }
    }
}

impl GradientClipper {
    /// Clip `gradients` in place and return the global norm measured before clipping.
    pub fn clip(&self, gradients: &mut Gradients) -> f32 {
        let global_norm = gradients.global_norm();

        match self {
            GradientClipper::ClipByValue { min, max } => {
                for grad in gradients.weights.iter_mut() {
                    grad.mapv_inplace(|g| g.max(*min).min(*max));
                }
                for grad in gradients.biases.iter_mut() {
                    grad.mapv_inplace(|g| g.max(*min).min(*max));
                }
            }

            GradientClipper::ClipByGlobalNorm { max_norm } => {
                // A non-finite norm is left for the caller to reject
                if global_norm.is_finite() && global_norm > *max_norm {
                    let scale = max_norm / global_norm;
                    for grad in gradients.weights.iter_mut() {
                        grad.mapv_inplace(|g| g * scale);
                    }
                    for grad in gradients.biases.iter_mut() {
                        grad.mapv_inplace(|g| g * scale);
                    }
                }
            }

            GradientClipper::None => {}
        }

        global_norm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn gradients() -> Gradients {
        Gradients {
            weights: vec![array![[3.0, 0.0]]],
            biases: vec![array![4.0]],
        }
    }

    #[test]
    fn test_global_norm_clipping_rescales() {
        let mut grads = gradients();
        let norm = GradientClipper::ClipByGlobalNorm { max_norm: 1.0 }.clip(&mut grads);
        assert_eq!(norm, 5.0);
        assert!((grads.global_norm() - 1.0).abs() < 1e-6);
        assert!((grads.weights[0][[0, 0]] - 0.6).abs() < 1e-6);
        assert!((grads.biases[0][0] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_global_norm_below_threshold_untouched() {
        let mut grads = gradients();
        GradientClipper::ClipByGlobalNorm { max_norm: 10.0 }.clip(&mut grads);
        assert_eq!(grads, gradients());
    }

    #[test]
    fn test_clipping_modes_build_matching_clippers() {
        assert_eq!(ClippingMode::default().clipper(2.0), GradientClipper::ClipByGlobalNorm { max_norm: 2.0 });
        assert_eq!(ClippingMode::Value.clipper(2.0), GradientClipper::ClipByValue { min: -2.0, max: 2.0 });
        assert_eq!(ClippingMode::None.clipper(2.0), GradientClipper::None);
    }

    #[test]
    fn test_no_clipping_reports_norm_only() {
        let mut grads = gradients();
        assert_eq!(GradientClipper::None.clip(&mut grads), 5.0);
        assert_eq!(grads, gradients());
    }

    #[test]
    fn test_clip_by_value() {
        let mut grads = gradients();
        GradientClipper::ClipByValue { min: -1.0, max: 1.0 }.clip(&mut grads);
        assert_eq!(grads.weights[0], array![[1.0, 0.0]]);
        assert_eq!(grads.biases[0], array![1.0]);
    }
}

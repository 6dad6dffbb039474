use ndarray::{Array1, Array2};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::{Normal, Uniform};
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::error::{DdpgError, Result};

/// Weight initialization strategies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WeightInit {
    /// Xavier/Glorot uniform initialization
    XavierUniform,

    /// Xavier/Glorot normal initialization
    XavierNormal,

    /// He/Kaiming uniform initialization (for ReLU)
    HeUniform,

    /// He/Kaiming normal initialization (for ReLU)
    HeNormal,

    /// Uniform distribution with custom range
    Uniform { min: f32, max: f32 },

    /// All zeros
    Zeros,
}

impl WeightInit {
    /// Draw a `(fan_in, fan_out)` weight matrix from `rng`.
    pub fn initialize_weights<R: Rng + ?Sized>(&self, shape: (usize, usize), rng: &mut R) -> Result<Array2<f32>> {
        let (fan_in, fan_out) = shape;

        let weights = match self {
            WeightInit::XavierUniform => {
                let limit = (6.0 / (fan_in + fan_out) as f32).sqrt();
                Array2::random_using(shape, Uniform::new(-limit, limit), rng)
            }

            WeightInit::XavierNormal => {
                let std = (2.0 / (fan_in + fan_out) as f32).sqrt();
                Array2::random_using(shape, normal(0.0, std)?, rng)
            }

            WeightInit::HeUniform => {
                let limit = (6.0 / fan_in as f32).sqrt();
                Array2::random_using(shape, Uniform::new(-limit, limit), rng)
            }

            WeightInit::HeNormal => {
                let std = (2.0 / fan_in as f32).sqrt();
                Array2::random_using(shape, normal(0.0, std)?, rng)
            }

            WeightInit::Uniform { min, max } => {
                if min >= max {
                    return Err(DdpgError::invalid_parameter(
                        "weight_init".to_string(),
                        format!("uniform range [{}, {}) is empty", min, max),
                    ));
                }
                Array2::random_using(shape, Uniform::new(*min, *max), rng)
            }

            WeightInit::Zeros => Array2::zeros(shape),
        };

        Ok(weights)
    }

    /// Biases start at zero for every scheme
    pub fn initialize_biases(&self, size: usize) -> Array1<f32> {
        Array1::zeros(size)
    }

    /// Get the recommended initialization for an activation function
    pub fn for_activation(activation: &Activation) -> Self {
        match activation {
            Activation::Relu | Activation::LeakyRelu { .. } | Activation::Elu { .. } => {
                WeightInit::HeUniform
            }
            Activation::Sigmoid | Activation::Tanh | Activation::Linear => {
                WeightInit::XavierUniform
            }
        }
    }
}

fn normal(mean: f32, std: f32) -> Result<Normal<f32>> {
    Normal::new(mean, std).map_err(|e| DdpgError::invalid_parameter("weight_init".to_string(), e.to_string()))
}

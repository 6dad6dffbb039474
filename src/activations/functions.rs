use ndarray::{Array2, ArrayView2};
use serde::{Serialize, Deserialize};

/// An enumeration of the activation functions a dense layer can apply.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum Activation {
    #[default]
    Relu,
    Linear,
    Sigmoid,
    Tanh,
    LeakyRelu { alpha: f32 },
    Elu { alpha: f32 },
}

impl Activation {
    /// Apply the activation function to a batch in-place.
    pub fn apply_batch(&self, inputs: &mut Array2<f32>) {
        match self {
            Activation::Relu => {
                inputs.mapv_inplace(|v| v.max(0.0));
            }
            Activation::Linear => {}
            Activation::Sigmoid => {
                inputs.mapv_inplace(|v| 1.0 / (1.0 + (-v).exp()));
            }
            Activation::Tanh => {
                inputs.mapv_inplace(|v| v.tanh());
            }
            Activation::LeakyRelu { alpha } => {
                let a = *alpha;
                inputs.mapv_inplace(|v| if v > 0.0 { v } else { a * v });
            }
            Activation::Elu { alpha } => {
                let a = *alpha;
                inputs.mapv_inplace(|v| if v > 0.0 { v } else { a * (v.exp() - 1.0) });
            }
        }
    }

    /// Derivative of the activation, evaluated at the pre-activation values.
    pub fn derivative_batch(&self, pre_activation: ArrayView2<f32>) -> Array2<f32> {
        match self {
            Activation::Relu => {
                pre_activation.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 })
            }
            Activation::Linear => {
                Array2::ones(pre_activation.dim())
            }
            Activation::Sigmoid => {
                pre_activation.mapv(|v| {
                    let sigmoid = 1.0 / (1.0 + (-v).exp());
                    sigmoid * (1.0 - sigmoid)
                })
            }
            Activation::Tanh => {
                pre_activation.mapv(|v| {
                    let tanh_v = v.tanh();
                    1.0 - tanh_v * tanh_v
                })
            }
            Activation::LeakyRelu { alpha } => {
                let a = *alpha;
                pre_activation.mapv(|v| if v > 0.0 { 1.0 } else { a })
            }
            Activation::Elu { alpha } => {
                let a = *alpha;
                pre_activation.mapv(|v| if v > 0.0 { 1.0 } else { a * v.exp() })
            }
        }
    }
}

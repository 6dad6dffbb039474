use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::error::{DdpgError, Result};
use super::initialization::WeightInit;

/// A fully connected (dense) layer: `activation(inputs · weights + biases)`
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DenseLayer {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub activation: Activation,
    #[serde(skip)]
    pre_activation_output: Option<Array2<f32>>,
    #[serde(skip)]
    inputs: Option<Array2<f32>>,
}

impl DenseLayer {
    /// Create a dense layer with weights drawn by `init` from `rng`, biases at zero.
    pub fn new_with_init<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        activation: Activation,
        init: WeightInit,
        rng: &mut R,
    ) -> Result<Self> {
        if input_size == 0 || output_size == 0 {
            return Err(DdpgError::invalid_parameter(
                "layer_size".to_string(),
                format!("dense layer {}x{} has a zero dimension", input_size, output_size),
            ));
        }
        let weights = init.initialize_weights((input_size, output_size), rng)?;
        let biases = init.initialize_biases(output_size);
        Ok(DenseLayer {
            weights,
            biases,
            activation,
            pre_activation_output: None,
            inputs: None,
        })
    }

    pub fn with_weights(mut self, weights: Array2<f32>) -> Self {
        assert_eq!(weights.dim(), self.weights.dim());
        self.weights = weights;
        self
    }

    pub fn with_biases(mut self, biases: Array1<f32>) -> Self {
        assert_eq!(biases.dim(), self.biases.dim());
        self.biases = biases;
        self
    }

    pub fn input_size(&self) -> usize {
        self.weights.nrows()
    }

    pub fn output_size(&self) -> usize {
        self.weights.ncols()
    }

    /// Forward pass that keeps the inputs and pre-activations for `backward_batch`.
    pub fn forward_batch(&mut self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let pre_activation = self.affine(inputs);
        let mut outputs = pre_activation.clone();
        self.activation.apply_batch(&mut outputs);
        self.inputs = Some(inputs.to_owned());
        self.pre_activation_output = Some(pre_activation);
        outputs
    }

    /// Forward pass that records nothing.
    pub fn predict_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut outputs = self.affine(inputs);
        self.activation.apply_batch(&mut outputs);
        outputs
    }

    /// Backpropagate `output_errors` (dL/d output) through the layer.
    ///
    /// Returns `(dL/d inputs, dL/d weights, dL/d biases)`.
    pub fn backward_batch(&self, output_errors: ArrayView2<f32>) -> Result<(Array2<f32>, Array2<f32>, Array1<f32>)> {
        let (pre_activation_output, inputs) = match (&self.pre_activation_output, &self.inputs) {
            (Some(pre), Some(inputs)) => (pre, inputs),
            _ => {
                return Err(DdpgError::invalid_parameter(
                    "backward_batch",
                    "called before forward_batch",
                ))
            }
        };
        if output_errors.dim() != pre_activation_output.dim() {
            return Err(DdpgError::shape_mismatch(
                format!("{:?}", pre_activation_output.dim()),
                format!("{:?}", output_errors.dim()),
            ));
        }

        let activation_deriv = self.activation.derivative_batch(pre_activation_output.view());
        let adjusted_error = &output_errors * &activation_deriv;
        let weight_gradients = inputs.t().dot(&adjusted_error);
        let bias_gradients = adjusted_error.sum_axis(Axis(0));
        let input_gradients = adjusted_error.dot(&self.weights.t());

        Ok((input_gradients, weight_gradients, bias_gradients))
    }

    fn affine(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        inputs.dot(&self.weights) + &self.biases.view().insert_axis(Axis(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn linear_layer() -> DenseLayer {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        DenseLayer::new_with_init(2, 1, Activation::Linear, WeightInit::Zeros, &mut rng)
            .unwrap()
            .with_weights(array![[2.0], [-1.0]])
            .with_biases(array![0.5])
    }

    #[test]
    fn test_forward_and_predict_agree() {
        let mut layer = linear_layer();
        let inputs = array![[1.0, 1.0], [0.0, 2.0]];
        let recorded = layer.forward_batch(inputs.view());
        let plain = layer.predict_batch(inputs.view());
        assert_eq!(recorded, plain);
        assert_eq!(recorded, array![[1.5], [-1.5]]);
    }

    #[test]
    fn test_backward_gradients() {
        let mut layer = linear_layer();
        let inputs = array![[1.0, 3.0]];
        layer.forward_batch(inputs.view());
        let (input_grad, weight_grad, bias_grad) = layer.backward_batch(array![[1.0]].view()).unwrap();
        assert_eq!(input_grad, array![[2.0, -1.0]]);
        assert_eq!(weight_grad, array![[1.0], [3.0]]);
        assert_eq!(bias_grad, array![1.0]);
    }

    #[test]
    fn test_backward_without_forward_fails() {
        let layer = linear_layer();
        assert!(layer.backward_batch(array![[1.0]].view()).is_err());
    }
}

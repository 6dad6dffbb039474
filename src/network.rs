use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::error::{DdpgError, Result};
use crate::layers::{DenseLayer, WeightInit};

/// Per-layer parameter gradients, ordered from input layer to output layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradients {
    pub weights: Vec<Array2<f32>>,
    pub biases: Vec<Array1<f32>>,
}

impl Gradients {
    /// L2 norm over every weight and bias gradient together
    pub fn global_norm(&self) -> f32 {
        let weight_norm_sq: f32 = self.weights.iter()
            .map(|g| g.iter().map(|&x| x * x).sum::<f32>())
            .sum();
        let bias_norm_sq: f32 = self.biases.iter()
            .map(|g| g.iter().map(|&x| x * x).sum::<f32>())
            .sum();
        (weight_norm_sq + bias_norm_sq).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.weights.iter().all(|g| g.iter().all(|x| x.is_finite()))
            && self.biases.iter().all(|g| g.iter().all(|x| x.is_finite()))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// A differentiable function approximator.
///
/// `forward_batch` records whatever `backward_batch` needs; `predict_batch` records
/// nothing, so values it produces can never feed a gradient.
pub trait FunctionApproximator: Clone {
    fn input_size(&self) -> usize;

    fn output_size(&self) -> usize;

    /// Forward pass that is kept for a following `backward_batch`.
    fn forward_batch(&mut self, inputs: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Forward pass outside the differentiation graph.
    fn predict_batch(&self, inputs: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Given dL/d output for the last `forward_batch`, return the parameter gradients
    /// and dL/d input.
    fn backward_batch(&self, output_grad: ArrayView2<f32>) -> Result<(Gradients, Array2<f32>)>;

    /// `(weights, biases)` per layer, input layer first.
    fn parameters(&self) -> Vec<(&Array2<f32>, &Array1<f32>)>;

    fn parameters_mut(&mut self) -> Vec<(&mut Array2<f32>, &mut Array1<f32>)>;

    /// Single-input convenience around `predict_batch`.
    fn predict(&self, input: ArrayView1<f32>) -> Result<Array1<f32>> {
        let output = self.predict_batch(input.insert_axis(Axis(0)))?;
        Ok(output.index_axis_move(Axis(0), 0))
    }
}

/// A feed-forward stack of dense layers.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NeuralNetwork {
    pub layers: Vec<DenseLayer>,
}

impl NeuralNetwork {
    /// Build a network from consecutive `layer_sizes`, one activation per layer.
    ///
    /// Hidden layers use the initializer recommended for their activation; the output
    /// layer starts in `[-3e-3, 3e-3]` so initial actions and values sit near zero.
    pub fn new(layer_sizes: &[usize], activations: &[Activation], rng: &mut ChaCha8Rng) -> Result<Self> {
        Self::with_hidden_init(layer_sizes, activations, None, rng)
    }

    /// Like [`NeuralNetwork::new`], with `hidden_init` overriding the per-activation
    /// choice for hidden layers when given.
    pub fn with_hidden_init(
        layer_sizes: &[usize],
        activations: &[Activation],
        hidden_init: Option<WeightInit>,
        rng: &mut ChaCha8Rng,
    ) -> Result<Self> {
        if layer_sizes.len() < 2 || layer_sizes.len() - 1 != activations.len() {
            return Err(DdpgError::invalid_parameter(
                "layer_sizes".to_string(),
                format!(
                    "{} sizes need {} activations, got {}",
                    layer_sizes.len(),
                    layer_sizes.len().saturating_sub(1),
                    activations.len()
                ),
            ));
        }

        let last = activations.len() - 1;
        let layers = layer_sizes
            .windows(2)
            .zip(activations.iter())
            .enumerate()
            .map(|(i, (window, &activation))| {
                let init = if i == last {
                    WeightInit::Uniform { min: -3e-3, max: 3e-3 }
                } else {
                    hidden_init.unwrap_or_else(|| WeightInit::for_activation(&activation))
                };
                DenseLayer::new_with_init(window[0], window[1], activation, init, rng)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(NeuralNetwork { layers })
    }

    /// Wrap hand-built layers, checking that their sizes chain.
    pub fn from_layers(layers: Vec<DenseLayer>) -> Result<Self> {
        if layers.is_empty() {
            return Err(DdpgError::invalid_parameter("layers", "network needs at least one layer"));
        }
        for pair in layers.windows(2) {
            if pair[0].output_size() != pair[1].input_size() {
                return Err(DdpgError::shape_mismatch(
                    format!("{} inputs", pair[0].output_size()),
                    format!("{} inputs", pair[1].input_size()),
                ));
            }
        }
        Ok(NeuralNetwork { layers })
    }

    fn check_input(&self, inputs: &ArrayView2<f32>) -> Result<()> {
        let expected = self.input_size();
        if inputs.ncols() != expected {
            return Err(DdpgError::shape_mismatch(
                format!("{} input columns", expected),
                format!("{} input columns", inputs.ncols()),
            ));
        }
        Ok(())
    }
}

impl FunctionApproximator for NeuralNetwork {
    fn input_size(&self) -> usize {
        self.layers.first().map_or(0, |l| l.input_size())
    }

    fn output_size(&self) -> usize {
        self.layers.last().map_or(0, |l| l.output_size())
    }

    fn forward_batch(&mut self, inputs: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_input(&inputs)?;
        let mut current_output = inputs.to_owned();
        for layer in &mut self.layers {
            current_output = layer.forward_batch(current_output.view());
        }
        Ok(current_output)
    }

    fn predict_batch(&self, inputs: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_input(&inputs)?;
        let mut current_output = inputs.to_owned();
        for layer in &self.layers {
            current_output = layer.predict_batch(current_output.view());
        }
        Ok(current_output)
    }

    fn backward_batch(&self, output_grad: ArrayView2<f32>) -> Result<(Gradients, Array2<f32>)> {
        let mut weights = Vec::with_capacity(self.layers.len());
        let mut biases = Vec::with_capacity(self.layers.len());
        let mut current_error = output_grad.to_owned();

        for layer in self.layers.iter().rev() {
            let (input_grad, weight_grad, bias_grad) = layer.backward_batch(current_error.view())?;
            weights.push(weight_grad);
            biases.push(bias_grad);
            current_error = input_grad;
        }

        weights.reverse();
        biases.reverse();
        Ok((Gradients { weights, biases }, current_error))
    }

    fn parameters(&self) -> Vec<(&Array2<f32>, &Array1<f32>)> {
        self.layers.iter().map(|l| (&l.weights, &l.biases)).collect()
    }

    fn parameters_mut(&mut self) -> Vec<(&mut Array2<f32>, &mut Array1<f32>)> {
        self.layers.iter_mut().map(|l| (&mut l.weights, &mut l.biases)).collect()
    }
}

/// Blend target parameters toward local: `θ_target ← τ·θ_local + (1−τ)·θ_target`.
pub fn soft_update<N: FunctionApproximator>(local: &N, target: &mut N, tau: f32) -> Result<()> {
    let local_params = local.parameters();
    let mut target_params = target.parameters_mut();
    check_same_architecture(&local_params, &target_params)?;

    for ((lw, lb), (tw, tb)) in local_params.into_iter().zip(target_params.iter_mut()) {
        tw.zip_mut_with(lw, |t, &l| *t = tau * l + (1.0 - tau) * *t);
        tb.zip_mut_with(lb, |t, &l| *t = tau * l + (1.0 - tau) * *t);
    }
    Ok(())
}

/// Overwrite `to` with the parameters of `from`.
pub fn copy_model_over<N: FunctionApproximator>(from: &N, to: &mut N) -> Result<()> {
    soft_update(from, to, 1.0)
}

fn check_same_architecture(
    local: &[(&Array2<f32>, &Array1<f32>)],
    target: &[(&mut Array2<f32>, &mut Array1<f32>)],
) -> Result<()> {
    let local_shapes: Vec<_> = local.iter().map(|(w, b)| (w.dim(), b.len())).collect();
    let target_shapes: Vec<_> = target.iter().map(|(w, b)| (w.dim(), b.len())).collect();
    if local_shapes != target_shapes {
        return Err(DdpgError::shape_mismatch(
            format!("{:?}", local_shapes),
            format!("{:?}", target_shapes),
        ));
    }
    Ok(())
}

/// Which half of the actor-critic pair a network serves
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkRole {
    Actor,
    Critic,
}

/// Builds the function approximators the agent trains.
pub trait NetworkFactory {
    type Network: FunctionApproximator;

    fn create_network(&mut self, input_dim: usize, output_dim: usize, role: NetworkRole) -> Result<Self::Network>;
}

/// Hidden layout and activations of one dense network
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkArchitecture {
    pub hidden_units: Vec<usize>,
    pub hidden_activation: Activation,
    pub final_activation: Activation,
    /// Hidden-layer initializer; `None` picks one per activation
    #[serde(default)]
    pub hidden_init: Option<WeightInit>,
}

impl NetworkArchitecture {
    pub fn layer_sizes(&self, input_dim: usize, output_dim: usize) -> Vec<usize> {
        let mut sizes = vec![input_dim];
        sizes.extend_from_slice(&self.hidden_units);
        sizes.push(output_dim);
        sizes
    }

    pub fn activations(&self) -> Vec<Activation> {
        vec![self.hidden_activation; self.hidden_units.len()]
            .into_iter()
            .chain(std::iter::once(self.final_activation))
            .collect()
    }
}

/// Default factory: seeded dense MLPs, one architecture per role.
pub struct MlpFactory {
    actor: NetworkArchitecture,
    critic: NetworkArchitecture,
    rng: ChaCha8Rng,
}

impl MlpFactory {
    pub fn new(actor: NetworkArchitecture, critic: NetworkArchitecture, seed: u64) -> Self {
        MlpFactory {
            actor,
            critic,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl NetworkFactory for MlpFactory {
    type Network = NeuralNetwork;

    fn create_network(&mut self, input_dim: usize, output_dim: usize, role: NetworkRole) -> Result<NeuralNetwork> {
        let architecture = match role {
            NetworkRole::Actor => &self.actor,
            NetworkRole::Critic => &self.critic,
        };
        let sizes = architecture.layer_sizes(input_dim, output_dim);
        let activations = architecture.activations();
        NeuralNetwork::with_hidden_init(&sizes, &activations, architecture.hidden_init, &mut self.rng)
    }
}

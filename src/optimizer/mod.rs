//! # Optimizers
//!
//! Parameter update rules applied to a network's `(weights, biases)` pairs given the
//! [`Gradients`] from a backward pass, plus the gradient clipping and learning-rate
//! scheduling that surround each step.

pub mod gradient_clipper;
pub mod lr_scheduler;

use ndarray::{Array1, Array2};
use serde::{Serialize, Deserialize};

use crate::error::{DdpgError, Result};
use crate::network::Gradients;

pub use gradient_clipper::{ClippingMode, GradientClipper};
pub use lr_scheduler::{LearningRateScheduler, ScheduleProgress};

pub trait Optimizer {
    /// Apply one update to every `(weights, biases)` pair, in layer order.
    fn step(
        &mut self,
        parameters: Vec<(&mut Array2<f32>, &mut Array1<f32>)>,
        gradients: &Gradients,
        learning_rate: f32,
    ) -> Result<()>;
}

/// Which update rule a network is trained with
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum OptimizerKind {
    /// Adam with `epsilon = 1e-4`
    #[default]
    Adam,
    SGD,
}

impl OptimizerKind {
    /// A fresh optimizer with no accumulated state
    pub fn build(&self) -> OptimizerWrapper {
        match self {
            OptimizerKind::Adam => OptimizerWrapper::Adam(Adam::for_ddpg()),
            OptimizerKind::SGD => OptimizerWrapper::SGD(SGD::new()),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum OptimizerWrapper {
    SGD(SGD),
    Adam(Adam),
}

impl Optimizer for OptimizerWrapper {
    fn step(
        &mut self,
        parameters: Vec<(&mut Array2<f32>, &mut Array1<f32>)>,
        gradients: &Gradients,
        learning_rate: f32,
    ) -> Result<()> {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.step(parameters, gradients, learning_rate),
            OptimizerWrapper::Adam(optimizer) => optimizer.step(parameters, gradients, learning_rate),
        }
    }
}

impl OptimizerWrapper {
    /// Check that any accumulated state fits `parameters`, e.g. after loading a checkpoint.
    pub fn check_state(&self, parameters: &[(&Array2<f32>, &Array1<f32>)]) -> Result<()> {
        match self {
            OptimizerWrapper::SGD(_) => Ok(()),
            OptimizerWrapper::Adam(optimizer) => optimizer.check_state(parameters),
        }
    }
}

fn check_gradient_shapes(
    parameters: &[(&mut Array2<f32>, &mut Array1<f32>)],
    gradients: &Gradients,
) -> Result<()> {
    let param_shapes: Vec<_> = parameters.iter().map(|(w, b)| (w.dim(), b.len())).collect();
    let grad_shapes: Vec<_> = gradients.weights.iter()
        .zip(gradients.biases.iter())
        .map(|(w, b)| (w.dim(), b.len()))
        .collect();
    if param_shapes != grad_shapes || gradients.weights.len() != gradients.biases.len() {
        return Err(DdpgError::shape_mismatch(
            format!("gradients shaped {:?}", param_shapes),
            format!("{:?}", grad_shapes),
        ));
    }
    Ok(())
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SGD;

impl SGD {
    pub fn new() -> SGD {
        SGD
    }
}

impl Default for SGD {
    fn default() -> Self {
        Self::new()
    }
}

impl Optimizer for SGD {
    fn step(
        &mut self,
        parameters: Vec<(&mut Array2<f32>, &mut Array1<f32>)>,
        gradients: &Gradients,
        learning_rate: f32,
    ) -> Result<()> {
        check_gradient_shapes(&parameters, gradients)?;
        for ((weights, biases), (wg, bg)) in parameters
            .into_iter()
            .zip(gradients.weights.iter().zip(gradients.biases.iter()))
        {
            weights.zip_mut_with(wg, |w, &g| *w -= learning_rate * g);
            biases.zip_mut_with(bg, |b, &g| *b -= learning_rate * g);
        }
        Ok(())
    }
}

/// Adam with bias-corrected moments, one moment pair per parameter tensor.
///
/// Moment buffers are allocated on the first step from the parameter shapes.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Adam {
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    m_weights: Vec<Array2<f32>>,
    v_weights: Vec<Array2<f32>>,
    m_biases: Vec<Array1<f32>>,
    v_biases: Vec<Array1<f32>>,
    /// Number of steps taken so far
    pub t: usize,
}

impl Adam {
    pub fn new(beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Adam {
            beta1,
            beta2,
            epsilon,
            m_weights: Vec::new(),
            v_weights: Vec::new(),
            m_biases: Vec::new(),
            v_biases: Vec::new(),
            t: 0,
        }
    }

    /// Adam as the actor and critic use it: default betas, `epsilon = 1e-4`.
    pub fn for_ddpg() -> Self {
        Self::new(0.9, 0.999, 1e-4)
    }

    fn moment_shapes(&self) -> Vec<((usize, usize), usize)> {
        self.m_weights.iter()
            .zip(self.m_biases.iter())
            .map(|(w, b)| (w.dim(), b.len()))
            .collect()
    }

    fn moments_consistent(&self) -> bool {
        self.m_weights.len() == self.v_weights.len()
            && self.m_biases.len() == self.m_weights.len()
            && self.v_biases.len() == self.m_weights.len()
            && self.m_weights.iter().zip(self.v_weights.iter()).all(|(m, v)| m.dim() == v.dim())
            && self.m_biases.iter().zip(self.v_biases.iter()).all(|(m, v)| m.len() == v.len())
    }

    /// Moments, once allocated, must match the parameter shapes layer by layer.
    pub fn check_state(&self, parameters: &[(&Array2<f32>, &Array1<f32>)]) -> Result<()> {
        if self.m_weights.is_empty() && self.m_biases.is_empty() && self.v_weights.is_empty() && self.v_biases.is_empty() {
            return Ok(());
        }
        let expected: Vec<_> = parameters.iter().map(|(w, b)| (w.dim(), b.len())).collect();
        let actual = self.moment_shapes();
        if !self.moments_consistent() || expected != actual {
            return Err(DdpgError::shape_mismatch(
                format!("Adam moments shaped {:?}", expected),
                format!("{:?}", actual),
            ));
        }
        Ok(())
    }

    fn ensure_state(&mut self, parameters: &[(&mut Array2<f32>, &mut Array1<f32>)]) {
        let shapes: Vec<_> = parameters.iter().map(|(w, b)| (w.dim(), b.len())).collect();
        if self.moments_consistent() && self.moment_shapes() == shapes {
            return;
        }
        self.m_weights = parameters.iter().map(|(w, _)| Array2::zeros(w.dim())).collect();
        self.v_weights = parameters.iter().map(|(w, _)| Array2::zeros(w.dim())).collect();
        self.m_biases = parameters.iter().map(|(_, b)| Array1::zeros(b.len())).collect();
        self.v_biases = parameters.iter().map(|(_, b)| Array1::zeros(b.len())).collect();
        self.t = 0;
    }
}

impl Default for Adam {
    fn default() -> Self {
        Self::new(0.9, 0.999, 1e-8)
    }
}

impl Optimizer for Adam {
    fn step(
        &mut self,
        parameters: Vec<(&mut Array2<f32>, &mut Array1<f32>)>,
        gradients: &Gradients,
        learning_rate: f32,
    ) -> Result<()> {
        check_gradient_shapes(&parameters, gradients)?;
        self.ensure_state(&parameters);
        self.t += 1;

        let (beta1, beta2, epsilon) = (self.beta1, self.beta2, self.epsilon);
        let bias_correction1 = 1.0 - beta1.powi(self.t as i32);
        let bias_correction2 = 1.0 - beta2.powi(self.t as i32);

        for (i, (weights, biases)) in parameters.into_iter().enumerate() {
            let m = &mut self.m_weights[i];
            let v = &mut self.v_weights[i];
            m.zip_mut_with(&gradients.weights[i], |m, &g| *m = beta1 * *m + (1.0 - beta1) * g);
            v.zip_mut_with(&gradients.weights[i], |v, &g| *v = beta2 * *v + (1.0 - beta2) * g * g);
            ndarray::Zip::from(weights).and(&*m).and(&*v).for_each(|w, &m, &v| {
                let m_hat = m / bias_correction1;
                let v_hat = v / bias_correction2;
                *w -= learning_rate * m_hat / (v_hat.sqrt() + epsilon);
            });

            let m = &mut self.m_biases[i];
            let v = &mut self.v_biases[i];
            m.zip_mut_with(&gradients.biases[i], |m, &g| *m = beta1 * *m + (1.0 - beta1) * g);
            v.zip_mut_with(&gradients.biases[i], |v, &g| *v = beta2 * *v + (1.0 - beta2) * g * g);
            ndarray::Zip::from(biases).and(&*m).and(&*v).for_each(|b, &m, &v| {
                let m_hat = m / bias_correction1;
                let v_hat = v / bias_correction2;
                *b -= learning_rate * m_hat / (v_hat.sqrt() + epsilon);
            });
        }

        Ok(())
    }
}

use ndarray::{Array1, ArrayView1};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

use crate::error::{DdpgError, Result};
use super::ExplorationStrategy;

/// Ornstein–Uhlenbeck process: `x ← x + θ(μ − x) + σ·ε`, `ε ~ N(0, 1)` per dimension.
///
/// The state is mean-reverting, so consecutive samples are correlated, which suits
/// physical control tasks with inertia.
#[derive(Clone, Debug)]
pub struct OrnsteinUhlenbeckNoise {
    mu: Array1<f32>,
    theta: f32,
    sigma: f32,
    state: Array1<f32>,
    rng: ChaCha8Rng,
}

impl OrnsteinUhlenbeckNoise {
    pub fn new(size: usize, mu: f32, theta: f32, sigma: f32, seed: u64) -> Result<Self> {
        if size == 0 {
            return Err(DdpgError::invalid_parameter("action_size", "noise needs at least one dimension"));
        }
        if !(theta >= 0.0) || !(sigma >= 0.0) {
            return Err(DdpgError::invalid_parameter(
                "ou_noise".to_string(),
                format!("theta ({}) and sigma ({}) must be non-negative", theta, sigma),
            ));
        }
        let mu = Array1::from_elem(size, mu);
        Ok(OrnsteinUhlenbeckNoise {
            state: mu.clone(),
            mu,
            theta,
            sigma,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Reset the internal state to the mean.
    pub fn reset(&mut self) {
        self.state.assign(&self.mu);
    }

    /// Advance the process one step and return the new state.
    pub fn sample(&mut self) -> Array1<f32> {
        let (theta, sigma) = (self.theta, self.sigma);
        let rng = &mut self.rng;
        ndarray::Zip::from(&mut self.state).and(&self.mu).for_each(|x, &mu| {
            let epsilon: f32 = rng.sample(StandardNormal);
            *x += theta * (mu - *x) + sigma * epsilon;
        });
        self.state.clone()
    }

    pub fn state(&self) -> ArrayView1<'_, f32> {
        self.state.view()
    }

    pub fn size(&self) -> usize {
        self.mu.len()
    }
}

/// Adds Ornstein–Uhlenbeck noise to the actor's action.
#[derive(Clone, Debug)]
pub struct OuNoiseExploration {
    noise: OrnsteinUhlenbeckNoise,
}

impl OuNoiseExploration {
    pub fn new(noise: OrnsteinUhlenbeckNoise) -> Self {
        OuNoiseExploration { noise }
    }

    pub fn noise(&self) -> &OrnsteinUhlenbeckNoise {
        &self.noise
    }
}

impl ExplorationStrategy for OuNoiseExploration {
    fn perturb_action(&mut self, action: ArrayView1<f32>) -> Result<Array1<f32>> {
        if action.len() != self.noise.size() {
            return Err(DdpgError::shape_mismatch(
                format!("{} action dimensions", self.noise.size()),
                format!("{} action dimensions", action.len()),
            ));
        }
        Ok(&action + &self.noise.sample())
    }

    fn reset(&mut self) {
        self.noise.reset();
    }
}

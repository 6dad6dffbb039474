//! # Configuration
//!
//! Hyperparameters are plain serde structs so they can be loaded from JSON:
//!
//! ```json
//! {
//!   "seed": 1,
//!   "hyperparameters": {
//!     "Actor":  { "learning_rate": 0.003, "gradient_clipping_norm": 5.0, "tau": 0.005,
//!                 "linear_hidden_units": [20, 20], "final_layer_activation": "Tanh" },
//!     "Critic": { "learning_rate": 0.02, "gradient_clipping_norm": 5.0, "tau": 0.005,
//!                 "buffer_size": 1000000, "linear_hidden_units": [20, 20] },
//!     "batch_size": 256,
//!     "discount_rate": 0.9,
//!     "update_every_n_steps": 10,
//!     "learning_updates_per_learning_session": 10
//!   }
//! }
//! ```
//!
//! Everything is checked by [`DdpgConfig::validate`] before an agent is built.

use serde::{Serialize, Deserialize};
use std::path::Path;

use crate::activations::Activation;
use crate::error::{DdpgError, Result};
use crate::layers::WeightInit;
use crate::network::{NetworkArchitecture, NetworkRole};
use crate::optimizer::{ClippingMode, GradientClipper, LearningRateScheduler, OptimizerKind};

fn default_hidden_units() -> Vec<usize> {
    vec![64, 64]
}

fn default_theta() -> f32 {
    0.15
}

fn default_sigma() -> f32 {
    0.2
}

/// Settings for one of the two network pairs
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkHyperparameters {
    pub learning_rate: f32,
    pub gradient_clipping_norm: f32,
    pub tau: f32,
    /// Replay capacity; the critic's value sizes the buffer
    #[serde(default)]
    pub buffer_size: Option<usize>,
    #[serde(default = "default_hidden_units")]
    pub linear_hidden_units: Vec<usize>,
    #[serde(default)]
    pub hidden_activation: Activation,
    /// Defaults to `Tanh` for the actor and `Linear` for the critic
    #[serde(default)]
    pub final_layer_activation: Option<Activation>,
    /// Hidden-layer initializer; unset picks one per activation
    #[serde(default)]
    pub weight_init: Option<WeightInit>,
    #[serde(default)]
    pub optimizer: OptimizerKind,
    /// How `gradient_clipping_norm` is applied
    #[serde(default)]
    pub clipping: ClippingMode,
}

impl NetworkHyperparameters {
    pub fn new(learning_rate: f32, gradient_clipping_norm: f32, tau: f32) -> Self {
        NetworkHyperparameters {
            learning_rate,
            gradient_clipping_norm,
            tau,
            buffer_size: None,
            linear_hidden_units: default_hidden_units(),
            hidden_activation: Activation::Relu,
            final_layer_activation: None,
            weight_init: None,
            optimizer: OptimizerKind::Adam,
            clipping: ClippingMode::GlobalNorm,
        }
    }

    pub fn clipper(&self) -> GradientClipper {
        self.clipping.clipper(self.gradient_clipping_norm)
    }

    pub fn architecture(&self, role: NetworkRole) -> NetworkArchitecture {
        let default_final = match role {
            NetworkRole::Actor => Activation::Tanh,
            NetworkRole::Critic => Activation::Linear,
        };
        NetworkArchitecture {
            hidden_units: self.linear_hidden_units.clone(),
            hidden_activation: self.hidden_activation,
            final_activation: self.final_layer_activation.unwrap_or(default_final),
            hidden_init: self.weight_init,
        }
    }

    fn validate(&self, prefix: &str) -> Result<()> {
        if !(self.learning_rate > 0.0) || !self.learning_rate.is_finite() {
            return Err(invalid(prefix, "learning_rate", format!("must be positive, got {}", self.learning_rate)));
        }
        if !(self.gradient_clipping_norm > 0.0) {
            return Err(invalid(
                prefix,
                "gradient_clipping_norm",
                format!("must be positive, got {}", self.gradient_clipping_norm),
            ));
        }
        if !(self.tau > 0.0 && self.tau <= 1.0) {
            return Err(invalid(prefix, "tau", format!("must be in (0, 1], got {}", self.tau)));
        }
        if self.buffer_size == Some(0) {
            return Err(invalid(prefix, "buffer_size", "must be greater than 0".to_string()));
        }
        if self.linear_hidden_units.iter().any(|&units| units == 0) {
            return Err(invalid(prefix, "linear_hidden_units", "layers need at least one unit".to_string()));
        }
        Ok(())
    }
}

fn invalid(prefix: &str, name: &str, reason: String) -> DdpgError {
    DdpgError::InvalidParameter {
        name: format!("{}.{}", prefix, name),
        reason,
    }
}

/// The full DDPG hyperparameter set
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DdpgHyperparameters {
    #[serde(rename = "Actor")]
    pub actor: NetworkHyperparameters,
    #[serde(rename = "Critic")]
    pub critic: NetworkHyperparameters,
    pub batch_size: usize,
    pub discount_rate: f32,
    pub update_every_n_steps: usize,
    pub learning_updates_per_learning_session: usize,
    /// Long-run mean of the exploration noise
    #[serde(default)]
    pub mu: f32,
    /// Mean reversion speed of the exploration noise
    #[serde(default = "default_theta")]
    pub theta: f32,
    /// Scale of the exploration noise
    #[serde(default = "default_sigma")]
    pub sigma: f32,
    /// Clamp every environment reward into `[-1, 1]` before storing it
    #[serde(default)]
    pub clip_rewards: bool,
    #[serde(default)]
    pub learning_rate_schedule: LearningRateScheduler,
}

impl DdpgHyperparameters {
    /// Replay capacity: the critic's `buffer_size`, else the actor's
    pub fn buffer_size(&self) -> Result<usize> {
        self.critic
            .buffer_size
            .or(self.actor.buffer_size)
            .ok_or_else(|| invalid("Critic", "buffer_size", "no replay buffer size configured".to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        self.actor.validate("Actor")?;
        self.critic.validate("Critic")?;

        let buffer_size = self.buffer_size()?;
        if self.batch_size == 0 {
            return Err(DdpgError::invalid_parameter("batch_size", "must be greater than 0"));
        }
        if self.batch_size > buffer_size {
            return Err(DdpgError::invalid_parameter(
                "batch_size".to_string(),
                format!("{} exceeds the buffer size {}", self.batch_size, buffer_size),
            ));
        }
        if !(0.0..=1.0).contains(&self.discount_rate) {
            return Err(DdpgError::invalid_parameter(
                "discount_rate".to_string(),
                format!("must be in [0, 1], got {}", self.discount_rate),
            ));
        }
        if self.update_every_n_steps == 0 {
            return Err(DdpgError::invalid_parameter("update_every_n_steps", "must be greater than 0"));
        }
        if self.learning_updates_per_learning_session == 0 {
            return Err(DdpgError::invalid_parameter(
                "learning_updates_per_learning_session",
                "must be greater than 0",
            ));
        }
        if !(self.theta >= 0.0) || !(self.sigma >= 0.0) || !self.mu.is_finite() {
            return Err(DdpgError::invalid_parameter(
                "ou_noise".to_string(),
                format!("mu {} theta {} sigma {} are not a valid noise process", self.mu, self.theta, self.sigma),
            ));
        }
        Ok(())
    }
}

/// Construction-time configuration for an agent
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DdpgConfig {
    /// Seeds the replay sampler, the exploration noise and weight initialization
    #[serde(default)]
    pub seed: u64,
    pub hyperparameters: DdpgHyperparameters,
}

impl DdpgConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: DdpgConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.hyperparameters.validate()
    }
}

impl Default for DdpgConfig {
    /// Small networks with the usual DDPG settings
    fn default() -> Self {
        let mut critic = NetworkHyperparameters::new(1e-3, 5.0, 5e-3);
        critic.buffer_size = Some(100_000);
        DdpgConfig {
            seed: 0,
            hyperparameters: DdpgHyperparameters {
                actor: NetworkHyperparameters::new(1e-4, 5.0, 5e-3),
                critic,
                batch_size: 64,
                discount_rate: 0.99,
                update_every_n_steps: 1,
                learning_updates_per_learning_session: 1,
                mu: 0.0,
                theta: default_theta(),
                sigma: default_sigma(),
                clip_rewards: false,
                learning_rate_schedule: LearningRateScheduler::Constant,
            },
        }
    }
}

//! # DDPG - Deep Deterministic Policy Gradient for Continuous Control
//!
//! An actor-critic reinforcement learning agent for environments with continuous action
//! spaces. Four function approximators (actor and critic, each with a local and a target
//! copy), an experience replay buffer, Ornstein-Uhlenbeck exploration noise and soft
//! target updates are wired into one off-policy training loop.
//!
//! ## Key Features
//!
//! - **Networks**: Dense feed-forward networks with analytic backpropagation, behind a
//!   [`network::FunctionApproximator`] trait so other backends can plug in
//! - **Optimizers**: Adam and SGD with global-norm gradient clipping
//! - **Exploration**: Seeded Ornstein-Uhlenbeck noise
//! - **Replay**: Fixed-capacity ring buffer with uniform sampling without replacement
//! - **Configuration**: JSON hyperparameter files via serde, or a builder
//! - **Checkpoints**: bincode save/load of networks, optimizer state and counters
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ddpg::agent::DdpgBuilder;
//! # use ddpg::environment::Environment;
//! # fn run<E: Environment>(env: &mut E) -> ddpg::error::Result<()> {
//! let mut agent = DdpgBuilder::new(env.state_size(), env.action_size())
//!     .hidden_sizes(vec![64, 64])
//!     .seed(1)
//!     .build()?;
//!
//! let rewards = agent.run_n_episodes(env, 50)?;
//! agent.save("ddpg.bin")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - Activation functions (ReLU, Tanh, Sigmoid, etc.)
//! - [`agent`] - The DDPG agent, its builder and episode bookkeeping
//! - [`config`] - Hyperparameters and JSON configuration
//! - [`debug`] - Non-finite value checks on gradients and parameters
//! - [`environment`] - The environment trait the control loop drives
//! - [`error`] - Error types and result handling
//! - [`exploration`] - Exploration strategies (Ornstein-Uhlenbeck noise)
//! - [`layers`] - Dense layers and weight initialization
//! - [`loss`] - Critic and actor losses
//! - [`metrics`] - Training metrics and rolling scores
//! - [`network`] - Function approximators, target updates and network factories
//! - [`optimizer`] - Optimizers, gradient clipping and learning-rate schedules
//! - [`replay_buffer`] - Experience replay

pub mod activations;
pub mod agent;
pub mod config;
pub mod debug;
pub mod environment;
pub mod error;
pub mod exploration;
pub mod layers;
pub mod loss;
pub mod metrics;
pub mod network;
pub mod optimizer;
pub mod replay_buffer;

#[cfg(test)]
mod tests;

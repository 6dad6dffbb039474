//! # Activation Functions Module
//!
//! Element-wise non-linearities used by the dense layers of the actor and critic.
//!
//! - **ReLU**: `max(0, x)`, the default for hidden layers
//! - **Tanh**: outputs in `[-1, 1]`, the usual actor output for bounded actions
//! - **Sigmoid**: outputs in `[0, 1]`
//! - **Linear**: identity, the critic's output layer
//! - **LeakyReLU** / **ELU**: ReLU variants that keep a gradient for negative inputs
//!
//! ```rust,no_run
//! use ddpg::activations::Activation;
//! use ndarray::array;
//!
//! let mut batch = array![[1.0, -0.5], [0.0, 2.0]];
//! Activation::Tanh.apply_batch(&mut batch);
//! ```

pub mod functions;

pub use functions::Activation;

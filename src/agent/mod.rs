//! # DDPG Agent
//!
//! The actor-critic learner and the control loop that drives it.
//!
//! ## Core Concepts
//!
//! - **Actor**: maps a state to a continuous action
//! - **Critic**: scores a (state, action) pair
//! - **Target networks**: slow copies of actor and critic used for bootstrapped targets,
//!   moved toward the local networks by soft update after every optimizer step
//! - **Exploration**: Ornstein-Uhlenbeck noise added to the actor's output while acting
//!
//! ## Control loop
//!
//! Each step of [`DdpgAgent::step`] picks an action, applies it to the environment,
//! learns when the buffer holds a full batch and the step count is a multiple of
//! `update_every_n_steps`, stores the transition and advances to the next state.
//!
//! ```rust,no_run
//! use ddpg::agent::DdpgBuilder;
//! # use ddpg::environment::Environment;
//! # fn train<E: Environment>(env: &mut E) -> ddpg::error::Result<()> {
//! let mut agent = DdpgBuilder::new(env.state_size(), env.action_size())
//!     .hidden_sizes(vec![32, 32])
//!     .batch_size(64)
//!     .seed(7)
//!     .build()?;
//!
//! for _ in 0..10 {
//!     agent.reset_game(env)?;
//!     agent.step(env)?;
//! }
//! println!("rolling score {:?}", agent.metrics().rolling_score());
//! # Ok(())
//! # }
//! ```

pub mod ddpg;
pub mod episode;

pub use ddpg::{DdpgAgent, DdpgBuilder, LearningReport};
pub use episode::EpisodeState;

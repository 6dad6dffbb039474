pub mod functions;

pub use functions::{actor_loss, actor_loss_gradient, Loss, MeanSquaredError};

//! Numerical health checks on gradients and parameters.

pub mod numerical_check;

pub use numerical_check::{check_gradients, check_parameters, ensure_finite_update, NumericalIssue};

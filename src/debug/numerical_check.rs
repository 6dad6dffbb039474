use crate::error::{DdpgError, Result};
use crate::network::{FunctionApproximator, Gradients};

/// Types of numerical issues
#[derive(Debug, Clone, PartialEq)]
pub enum NumericalIssue {
    NaN { layer: usize, count: usize },
    Infinity { layer: usize, count: usize },
}

fn count_issues<'a>(layer: usize, values: impl Iterator<Item = &'a f32>, issues: &mut Vec<NumericalIssue>) {
    let mut nan_count = 0;
    let mut inf_count = 0;
    for &value in values {
        if value.is_nan() {
            nan_count += 1;
        } else if value.is_infinite() {
            inf_count += 1;
        }
    }
    if nan_count > 0 {
        issues.push(NumericalIssue::NaN { layer, count: nan_count });
    }
    if inf_count > 0 {
        issues.push(NumericalIssue::Infinity { layer, count: inf_count });
    }
}

/// Check gradients for NaN and infinite values, per layer
pub fn check_gradients(gradients: &Gradients) -> Vec<NumericalIssue> {
    let mut issues = Vec::new();
    for (layer, (w, b)) in gradients.weights.iter().zip(gradients.biases.iter()).enumerate() {
        count_issues(layer, w.iter().chain(b.iter()), &mut issues);
    }
    issues
}

/// Check a network's parameters for NaN and infinite values, per layer
pub fn check_parameters<N: FunctionApproximator>(network: &N) -> Vec<NumericalIssue> {
    let mut issues = Vec::new();
    for (layer, (w, b)) in network.parameters().into_iter().enumerate() {
        count_issues(layer, w.iter().chain(b.iter()), &mut issues);
    }
    issues
}

/// Gate for a parameter update: the loss and the pre-clip gradient norm must be finite.
pub fn ensure_finite_update(network_name: &str, loss: f32, gradient_norm: f32, gradients: &Gradients) -> Result<()> {
    if !loss.is_finite() {
        return Err(DdpgError::NumericalInstability(format!(
            "{} loss is {}",
            network_name, loss
        )));
    }
    if !gradient_norm.is_finite() {
        let issues = check_gradients(gradients);
        return Err(DdpgError::NumericalInstability(format!(
            "{} gradient norm is {} ({:?})",
            network_name, gradient_norm, issues
        )));
    }
    Ok(())
}

use std::fmt;

/// Result type for DDPG operations
pub type Result<T> = std::result::Result<T, DdpgError>;

/// Main error type for the DDPG crate
#[derive(Debug, Clone, PartialEq)]
pub enum DdpgError {
    /// Sampling asked for more transitions than the buffer holds
    InsufficientData {
        requested: usize,
        available: usize,
    },

    /// Input width disagrees with what a network or batch expects
    ShapeMismatch {
        expected: String,
        actual: String,
    },

    /// Loss or gradient norm went non-finite; the update was not applied
    NumericalInstability(String),

    /// Invalid hyperparameter value
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// IO errors (config and checkpoint files)
    Io(String),

    /// Serialization/deserialization errors
    Serialization(String),
}

impl fmt::Display for DdpgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DdpgError::InsufficientData { requested, available } => {
                write!(
                    f,
                    "Insufficient data: requested a batch of {} but the buffer holds {}",
                    requested, available
                )
            }
            DdpgError::ShapeMismatch { expected, actual } => {
                write!(f, "Shape mismatch: expected {}, got {}", expected, actual)
            }
            DdpgError::NumericalInstability(msg) => write!(f, "Numerical instability: {}", msg),
            DdpgError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
            DdpgError::Io(msg) => write!(f, "IO error: {}", msg),
            DdpgError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for DdpgError {}

impl From<std::io::Error> for DdpgError {
    fn from(err: std::io::Error) -> Self {
        DdpgError::Io(err.to_string())
    }
}

impl From<bincode::Error> for DdpgError {
    fn from(err: bincode::Error) -> Self {
        DdpgError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for DdpgError {
    fn from(err: serde_json::Error) -> Self {
        DdpgError::Serialization(err.to_string())
    }
}

impl DdpgError {
    pub fn shape_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        DdpgError::ShapeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        DdpgError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error is isolated to one learning call and training can go on
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DdpgError::NumericalInstability(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_insufficient_data() {
        let err = DdpgError::InsufficientData { requested: 4, available: 2 };
        assert_eq!(
            err.to_string(),
            "Insufficient data: requested a batch of 4 but the buffer holds 2"
        );
    }

    #[test]
    fn test_only_instability_is_recoverable() {
        assert!(DdpgError::NumericalInstability("nan loss".into()).is_recoverable());
        assert!(!DdpgError::shape_mismatch("3 columns", "4 columns").is_recoverable());
        assert!(!DdpgError::invalid_parameter("tau", "must be positive").is_recoverable());
    }
}

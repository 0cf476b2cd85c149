use std::fmt;

/// Result type for deepq operations
pub type Result<T> = std::result::Result<T, DeepqError>;

/// Main error type for the deepq library
#[derive(Debug, Clone)]
pub enum DeepqError {
    /// Transition fields inconsistent with the shape established by the memory
    ShapeMismatch {
        expected: usize,
        actual: usize,
    },

    /// Unknown sampling method name
    UnsupportedSamplingMethod(String),

    /// Exploration constant outside [0, 1] at selection time
    InvalidExplorationRange(f32),

    /// Sampling from an empty memory
    InsufficientData {
        requested: usize,
    },

    /// Invalid parameter value
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// Failure reported by the value estimator
    Estimator(String),
}

impl fmt::Display for DeepqError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeepqError::ShapeMismatch { expected, actual } => {
                write!(f, "Shape mismatch: expected width {}, got {}", expected, actual)
            }
            DeepqError::UnsupportedSamplingMethod(method) => {
                write!(f, "Unsupported sampling method '{}'", method)
            }
            DeepqError::InvalidExplorationRange(exploration) => {
                write!(f, "Exploration must be in [0, 1], but was {}", exploration)
            }
            DeepqError::InsufficientData { requested } => {
                write!(f, "Requested {} transitions from an empty memory", requested)
            }
            DeepqError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
            DeepqError::Estimator(msg) => write!(f, "Estimator error: {}", msg),
        }
    }
}

impl std::error::Error for DeepqError {}

// Helper functions for common error patterns
impl DeepqError {
    pub fn shape_mismatch(expected: usize, actual: usize) -> Self {
        DeepqError::ShapeMismatch { expected, actual }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        DeepqError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

use thiserror::Error;

// ---------------------------------------------------------------------------
// TrajectoryError – everything a builder can refuse or fail on
// ---------------------------------------------------------------------------

/// Errors raised while validating parameters, building a trajectory or
/// writing it out.
#[derive(Debug, Error)]
pub enum TrajectoryError {
    /// A single parameter is out of range (non-positive, odd where an even
    /// value is required, unknown table index, ...).
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    /// A bounded search or accumulation loop hit its iteration cap.
    #[error("{what} did not converge within {iterations} iterations")]
    ConvergenceFailure {
        what: &'static str,
        iterations: usize,
    },

    /// Parameters are individually valid but contradict each other.
    #[error("inconsistent configuration: {0}")]
    ConfigurationInconsistency(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TrajectoryError {
    pub(crate) fn invalid(
        name: &'static str,
        value: impl ToString,
        reason: &'static str,
    ) -> Self {
        TrajectoryError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

pub type Result<T> = std::result::Result<T, TrajectoryError>;

// ⚠️ Error taxonomy for the cost core
// Both conditions are local and recoverable: the call is rejected, nothing is defaulted.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CostError {
    /// Malformed numeric input (negative cost, zero years, negative rate, bad label)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Unknown institution or academic year
    #[error("Not found: {0}")]
    NotFound(String),
}

impl CostError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        CostError::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        CostError::NotFound(msg.into())
    }

    /// Short machine-readable name, used in API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            CostError::InvalidArgument(_) => "invalid_argument",
            CostError::NotFound(_) => "not_found",
        }
    }
}

pub type Result<T> = std::result::Result<T, CostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = CostError::not_found("institution 'Nowhere U'");
        assert_eq!(error.to_string(), "Not found: institution 'Nowhere U'");

        let error = CostError::invalid("years must be at least 1");
        assert_eq!(error.to_string(), "Invalid argument: years must be at least 1");
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(CostError::invalid("x").kind(), "invalid_argument");
        assert_eq!(CostError::not_found("x").kind(), "not_found");
    }
}

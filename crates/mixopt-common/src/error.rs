//! Error types for MixOpt
//!
//! Provides a unified error type and domain-specific error variants

use thiserror::Error;

/// Result type alias using MixError
pub type Result<T> = std::result::Result<T, MixError>;

/// Unified error type for MixOpt operations
#[derive(Debug, Error)]
pub enum MixError {
    // Curve parameter errors
    #[error("Curve error: {0}")]
    Curve(#[from] CurveError),

    // Curve fitting errors
    #[error("Fit error: {0}")]
    Fit(#[from] FitError),

    // Optimization errors
    #[error("Optimization error: {0}")]
    Optimize(#[from] OptimizeError),

    // Lookup errors
    #[error("Not found: {0}")]
    NotFound(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MixError {
    /// Whether the error was caused by caller input rather than the system
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            MixError::Curve(_) | MixError::Fit(_) | MixError::Optimize(_)
        )
    }
}

/// Invalid Hill curve parameters
#[derive(Debug, Error)]
pub enum CurveError {
    #[error("Parameter {name} must be finite and positive, got {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

/// Curve fitting errors
#[derive(Debug, Error)]
pub enum FitError {
    #[error("Not enough observations for {channel}: got {got}, need {required}")]
    InsufficientData {
        channel: String,
        got: usize,
        required: usize,
    },

    #[error("Invalid observation for {channel} at index {index}: {reason}")]
    InvalidObservation {
        channel: String,
        index: usize,
        reason: String,
    },

    #[error("All spend observations are zero for {channel}")]
    ZeroSpend { channel: String },

    #[error("Gradient descent diverged for {channel}")]
    Diverged { channel: String },

    #[error("Duplicate channel history: {0}")]
    DuplicateChannel(String),

    #[error("Invalid fitter configuration: {0}")]
    InvalidConfig(String),
}

/// Budget optimization errors
#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("No channels to allocate budget across")]
    NoChannels,

    #[error("No saturation curve for channel: {0}")]
    MissingCurve(String),

    #[error("Duplicate channel constraint: {0}")]
    DuplicateChannel(String),

    #[error("Total budget must be finite and positive, got {0}")]
    InvalidBudget(f64),

    #[error("Budget {budget} is infeasible: constraints allow {min_total} to {max_total}")]
    InfeasibleBudget {
        budget: f64,
        min_total: f64,
        max_total: f64,
    },

    #[error("Invalid constraint for {channel}: {reason}")]
    InvalidConstraint { channel: String, reason: String },

    #[error("Invalid optimizer configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid scenario {name}: {reason}")]
    InvalidScenario { name: String, reason: String },

    #[error("Invalid allocation: {0}")]
    InvalidAllocation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MixError::Fit(FitError::InsufficientData {
            channel: "search".to_string(),
            got: 2,
            required: 3,
        });
        assert!(err.to_string().contains("got 2, need 3"));
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_infeasible_budget_display() {
        let err = OptimizeError::InfeasibleBudget {
            budget: 100.0,
            min_total: 150.0,
            max_total: 500.0,
        };
        assert!(err.to_string().contains("150 to 500"));
    }

    #[test]
    fn test_internal_is_not_input_error() {
        let err = MixError::Internal("boom".to_string());
        assert!(!err.is_invalid_input());
    }
}

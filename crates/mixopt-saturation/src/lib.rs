//! # Saturation
//!
//! Hill saturation curve fitting for MixOpt.
//!
//! ## Model
//!
//! ```text
//! revenue = α · spend^γ / (β^γ + spend^γ)
//! ```
//!
//! Each channel's `(spend, revenue)` history is normalized by its maximum
//! spend and revenue, fit by gradient descent on mean squared error, and
//! the parameters are scaled back to currency units.

pub mod fitter;
pub mod gradient;

use mixopt_common::FitError;
use serde::{Deserialize, Serialize};

pub use fitter::SaturationCurveFitter;

/// Curve fitter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitterConfig {
    /// Initial gradient step size (adapted during the fit)
    pub learning_rate: f64,
    /// Hard cap on gradient steps
    pub max_iterations: usize,
    /// Relative loss improvement below which the fit is considered converged
    pub tolerance: f64,
}

impl Default for FitterConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            max_iterations: 5000,
            tolerance: 1e-10,
        }
    }
}

impl FitterConfig {
    pub fn validate(&self) -> Result<(), FitError> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(FitError::InvalidConfig(
                "learning_rate must be finite and positive".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(FitError::InvalidConfig(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(FitError::InvalidConfig(
                "tolerance must be finite and non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

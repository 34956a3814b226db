//! HillCurve - diminishing returns of ad spend
//!
//! ```text
//! revenue = α · s^γ / (β^γ + s^γ)
//! ```
//!
//! - α: saturation ceiling, the revenue approached as spend grows without bound
//! - β: half-saturation spend, where revenue reaches α / 2
//! - γ: shape; γ > 1 gives an S-curve, γ ≤ 1 a concave curve

use serde::{Deserialize, Serialize};

use crate::error::CurveError;

/// Three-parameter Hill saturation curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HillCurve {
    /// Saturation ceiling (revenue units)
    pub alpha: f64,
    /// Half-saturation spend (currency units)
    pub beta: f64,
    /// Shape exponent
    pub gamma: f64,
}

impl HillCurve {
    /// Create a curve, rejecting non-finite or non-positive parameters
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Result<Self, CurveError> {
        let curve = Self { alpha, beta, gamma };
        curve.validate()?;
        Ok(curve)
    }

    /// Check every parameter is finite and strictly positive
    pub fn validate(&self) -> Result<(), CurveError> {
        for (name, value) in [("alpha", self.alpha), ("beta", self.beta), ("gamma", self.gamma)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CurveError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }

    /// Fraction of the ceiling reached at `spend`, in [0, 1)
    #[inline]
    pub fn saturation(&self, spend: f64) -> f64 {
        if spend <= 0.0 {
            return 0.0;
        }
        // h = 1 / (1 + (β/s)^γ) stays finite for very small and very large spend
        let u = (self.beta / spend).powf(self.gamma);
        1.0 / (1.0 + u)
    }

    /// Expected revenue at `spend`
    #[inline]
    pub fn response(&self, spend: f64) -> f64 {
        self.alpha * self.saturation(spend)
    }

    /// Derivative of revenue with respect to spend
    ///
    /// At zero spend the derivative is evaluated at `β · 1e-6` so concave
    /// curves (γ < 1) report a large finite slope instead of infinity.
    pub fn marginal_response(&self, spend: f64) -> f64 {
        let s = if spend > 0.0 { spend } else { self.beta * 1e-6 };
        let u = (self.beta / s).powf(self.gamma);
        if !u.is_finite() {
            return 0.0;
        }
        self.alpha * self.gamma * u / (s * (1.0 + u).powi(2))
    }

    /// Return on ad spend (revenue / spend); 0 when nothing is spent
    pub fn roas(&self, spend: f64) -> f64 {
        if spend <= 0.0 {
            return 0.0;
        }
        self.response(spend) / spend
    }
}

/// Goodness-of-fit figures reported by the curve fitter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitDiagnostics {
    /// Coefficient of determination on the training data
    pub r_squared: f64,
    /// Root mean squared error in revenue units
    pub rmse: f64,
    /// Gradient steps taken
    pub iterations: usize,
    /// Whether the loss settled below tolerance before the iteration cap
    pub converged: bool,
    /// Mean squared error in normalized units
    pub final_loss: f64,
    /// Number of observations used
    pub observations: usize,
}

/// Curve fitted for one channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedCurve {
    pub channel: String,
    pub curve: HillCurve,
    pub fit: FitDiagnostics,
}

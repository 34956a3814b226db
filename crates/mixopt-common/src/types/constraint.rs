//! Per-channel spend bounds

use serde::{Deserialize, Serialize};

use crate::error::OptimizeError;

/// Minimum and maximum spend allowed for one channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConstraint {
    pub channel: String,
    #[serde(default)]
    pub min_spend: f64,
    /// `None` means bounded only by the total budget
    #[serde(default)]
    pub max_spend: Option<f64>,
}

impl ChannelConstraint {
    /// Unbounded constraint (0 up to the whole budget)
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            min_spend: 0.0,
            max_spend: None,
        }
    }

    pub fn with_min(mut self, min_spend: f64) -> Self {
        self.min_spend = min_spend;
        self
    }

    pub fn with_max(mut self, max_spend: f64) -> Self {
        self.max_spend = Some(max_spend);
        self
    }

    /// Resolve into concrete `(min, max)` bounds for a given budget
    ///
    /// The max is capped at the budget but never below the min, so a min
    /// above the budget surfaces as an infeasible budget rather than a
    /// malformed constraint.
    pub fn bounds(&self, budget: f64) -> Result<(f64, f64), OptimizeError> {
        let invalid = |reason: &str| OptimizeError::InvalidConstraint {
            channel: self.channel.clone(),
            reason: reason.to_string(),
        };

        if !self.min_spend.is_finite() || self.min_spend < 0.0 {
            return Err(invalid("min_spend must be finite and non-negative"));
        }
        let max = match self.max_spend {
            Some(max) if !max.is_finite() || max < 0.0 => {
                return Err(invalid("max_spend must be finite and non-negative"))
            }
            Some(max) if self.min_spend > max => {
                return Err(invalid("min_spend exceeds max_spend"))
            }
            Some(max) => max.min(budget),
            None => budget,
        };
        Ok((self.min_spend, max.max(self.min_spend)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_default_to_budget() {
        let c = ChannelConstraint::new("social");
        assert_eq!(c.bounds(1000.0).unwrap(), (0.0, 1000.0));
    }

    #[test]
    fn test_max_capped_by_budget() {
        let c = ChannelConstraint::new("social").with_min(100.0).with_max(5000.0);
        assert_eq!(c.bounds(1000.0).unwrap(), (100.0, 1000.0));
    }

    #[test]
    fn test_min_above_max_rejected() {
        let c = ChannelConstraint::new("social").with_min(600.0).with_max(500.0);
        assert!(c.bounds(1000.0).is_err());
    }

    #[test]
    fn test_min_above_budget_kept_as_bounds() {
        let c = ChannelConstraint::new("social").with_min(5000.0);
        assert_eq!(c.bounds(1000.0).unwrap(), (5000.0, 5000.0));

        let c = ChannelConstraint::new("social").with_min(5000.0).with_max(8000.0);
        assert_eq!(c.bounds(1000.0).unwrap(), (5000.0, 5000.0));
    }

    #[test]
    fn test_negative_min_rejected() {
        let c = ChannelConstraint::new("social").with_min(-1.0);
        assert!(c.bounds(1000.0).is_err());
    }
}

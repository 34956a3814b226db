//! Scenarios - weighted outlooks on channel response
//!
//! The optimizer scores an allocation under every scenario and blends the
//! ROI values by normalized weight, so a split that only works in the
//! optimistic case is penalized.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::OptimizeError;

/// A weighted response outlook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name
    pub name: String,
    /// Relative weight (normalized across scenarios)
    pub weight: f64,
    /// Multiplier applied to every channel's expected revenue
    #[serde(default = "default_multiplier")]
    pub response_multiplier: f64,
    /// Extra per-channel multipliers, applied on top of `response_multiplier`
    #[serde(default)]
    pub channel_multipliers: HashMap<String, f64>,
}

fn default_multiplier() -> f64 {
    1.0
}

impl Scenario {
    pub fn new(name: impl Into<String>, weight: f64, response_multiplier: f64) -> Self {
        Self {
            name: name.into(),
            weight,
            response_multiplier,
            channel_multipliers: HashMap::new(),
        }
    }

    /// Expected case
    pub fn base() -> Self {
        Self::new("base", 1.0, 1.0)
    }

    /// Response 20% below expectation
    pub fn conservative() -> Self {
        Self::new("conservative", 1.0, 0.8)
    }

    /// Response 20% above expectation
    pub fn optimistic() -> Self {
        Self::new("optimistic", 1.0, 1.2)
    }

    /// Conservative / base / optimistic with 25/50/25 weights
    pub fn standard_set() -> Vec<Self> {
        vec![
            Self::conservative().with_weight(0.25),
            Self::base().with_weight(0.5),
            Self::optimistic().with_weight(0.25),
        ]
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_channel_multiplier(mut self, channel: impl Into<String>, multiplier: f64) -> Self {
        self.channel_multipliers.insert(channel.into(), multiplier);
        self
    }

    /// Combined multiplier for one channel
    pub fn multiplier_for(&self, channel: &str) -> f64 {
        self.response_multiplier * self.channel_multipliers.get(channel).copied().unwrap_or(1.0)
    }

    pub fn validate(&self) -> Result<(), OptimizeError> {
        let invalid = |reason: &str| OptimizeError::InvalidScenario {
            name: self.name.clone(),
            reason: reason.to_string(),
        };
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(invalid("weight must be finite and non-negative"));
        }
        if !self.response_multiplier.is_finite() || self.response_multiplier < 0.0 {
            return Err(invalid("response_multiplier must be finite and non-negative"));
        }
        if self
            .channel_multipliers
            .values()
            .any(|m| !m.is_finite() || *m < 0.0)
        {
            return Err(invalid("channel multipliers must be finite and non-negative"));
        }
        Ok(())
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::base()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier_for_channel() {
        let scenario = Scenario::optimistic().with_channel_multiplier("tv", 0.5);
        assert!((scenario.multiplier_for("tv") - 0.6).abs() < 1e-12);
        assert!((scenario.multiplier_for("search") - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_standard_set_weights() {
        let total: f64 = Scenario::standard_set().iter().map(|s| s.weight).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_negative_weight_rejected() {
        assert!(Scenario::base().with_weight(-0.1).validate().is_err());
    }

    #[test]
    fn test_deserialize_defaults() {
        let scenario: Scenario = serde_json::from_str(r#"{"name":"x","weight":2.0}"#).unwrap();
        assert_eq!(scenario.response_multiplier, 1.0);
        assert!(scenario.channel_multipliers.is_empty());
    }
}

//! Historical spend/revenue observations

use serde::{Deserialize, Serialize};

/// Spend and attributed revenue for one channel over one period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpendObservation {
    pub spend: f64,
    pub revenue: f64,
}

impl SpendObservation {
    pub fn new(spend: f64, revenue: f64) -> Self {
        Self { spend, revenue }
    }
}

impl From<(f64, f64)> for SpendObservation {
    fn from((spend, revenue): (f64, f64)) -> Self {
        Self { spend, revenue }
    }
}

/// Observation series for a single marketing channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelHistory {
    /// Channel name (e.g. "search", "social")
    pub channel: String,
    /// Observations in any order
    pub observations: Vec<SpendObservation>,
}

impl ChannelHistory {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            observations: Vec::new(),
        }
    }

    /// Builder-style append of one observation
    pub fn with_observation(mut self, spend: f64, revenue: f64) -> Self {
        self.observations.push(SpendObservation::new(spend, revenue));
        self
    }

    /// Build a history from (spend, revenue) pairs
    pub fn from_pairs(channel: impl Into<String>, pairs: &[(f64, f64)]) -> Self {
        Self {
            channel: channel.into(),
            observations: pairs.iter().copied().map(SpendObservation::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Total spend across all observations
    pub fn total_spend(&self) -> f64 {
        self.observations.iter().map(|o| o.spend).sum()
    }

    /// Total revenue across all observations
    pub fn total_revenue(&self) -> f64 {
        self.observations.iter().map(|o| o.revenue).sum()
    }

    /// Historical ROAS (0 when nothing was spent)
    pub fn historical_roas(&self) -> f64 {
        let spend = self.total_spend();
        if spend <= 0.0 {
            return 0.0;
        }
        self.total_revenue() / spend
    }
}

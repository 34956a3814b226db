//! Allocation problem: channels, curves, bounds, budget, scenarios

use std::collections::{HashMap, HashSet};

use mixopt_common::{
    ChannelConstraint, HillCurve, OptimizeError, ReportEntry, Result, Scenario,
};
use serde::{Deserialize, Serialize};

/// A scenario resolved against the problem's channel order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedScenario {
    pub name: String,
    /// Weight normalized so all scenarios sum to 1
    pub weight: f64,
    /// Response multiplier per channel, in problem order
    pub multipliers: Vec<f64>,
}

/// Validated budget allocation problem
///
/// Gene `i` of every individual is the spend on `channels[i]`, bounded by
/// `lower[i]..=upper[i]`; the genes of a feasible allocation sum to `budget`.
#[derive(Debug, Clone)]
pub struct AllocationProblem {
    channels: Vec<String>,
    curves: Vec<HillCurve>,
    lower: Vec<f64>,
    upper: Vec<f64>,
    budget: f64,
    scenarios: Vec<ResolvedScenario>,
    /// Σ_s ŵ_s · m_{s,i}
    blended: Vec<f64>,
}

impl AllocationProblem {
    /// Build a problem from fitted curves and constraints
    ///
    /// When `constraints` is empty every curve becomes an unconstrained
    /// channel (sorted by name). When `scenarios` is empty the base scenario
    /// is used.
    pub fn new(
        curves: &HashMap<String, HillCurve>,
        constraints: &[ChannelConstraint],
        budget: f64,
        scenarios: &[Scenario],
    ) -> Result<Self> {
        if !budget.is_finite() || budget <= 0.0 {
            return Err(OptimizeError::InvalidBudget(budget).into());
        }

        let constraints: Vec<ChannelConstraint> = if constraints.is_empty() {
            let mut names: Vec<&String> = curves.keys().collect();
            names.sort();
            names.into_iter().map(|n| ChannelConstraint::new(n.as_str())).collect()
        } else {
            constraints.to_vec()
        };
        if constraints.is_empty() {
            return Err(OptimizeError::NoChannels.into());
        }

        let mut seen = HashSet::new();
        let mut channels = Vec::with_capacity(constraints.len());
        let mut resolved_curves = Vec::with_capacity(constraints.len());
        let mut lower = Vec::with_capacity(constraints.len());
        let mut upper = Vec::with_capacity(constraints.len());

        for constraint in &constraints {
            if !seen.insert(constraint.channel.as_str()) {
                return Err(OptimizeError::DuplicateChannel(constraint.channel.clone()).into());
            }
            let curve = curves
                .get(&constraint.channel)
                .ok_or_else(|| OptimizeError::MissingCurve(constraint.channel.clone()))?;
            curve.validate()?;
            let (min, max) = constraint.bounds(budget)?;

            channels.push(constraint.channel.clone());
            resolved_curves.push(*curve);
            lower.push(min);
            upper.push(max);
        }

        let min_total: f64 = lower.iter().sum();
        let max_total: f64 = upper.iter().sum();
        let slack = 1e-9 * budget;
        if min_total > budget + slack || max_total < budget - slack {
            return Err(OptimizeError::InfeasibleBudget {
                budget,
                min_total,
                max_total,
            }
            .into());
        }

        let scenarios = Self::resolve_scenarios(&channels, scenarios)?;
        let blended = (0..channels.len())
            .map(|i| scenarios.iter().map(|s| s.weight * s.multipliers[i]).sum())
            .collect();

        Ok(Self {
            channels,
            curves: resolved_curves,
            lower,
            upper,
            budget,
            scenarios,
            blended,
        })
    }

    fn resolve_scenarios(
        channels: &[String],
        scenarios: &[Scenario],
    ) -> Result<Vec<ResolvedScenario>> {
        let base = [Scenario::base()];
        let scenarios = if scenarios.is_empty() { &base[..] } else { scenarios };

        for scenario in scenarios {
            scenario.validate()?;
        }
        let total_weight: f64 = scenarios.iter().map(|s| s.weight).sum();
        if total_weight <= 0.0 {
            return Err(OptimizeError::InvalidScenario {
                name: scenarios[0].name.clone(),
                reason: "scenario weights must sum to a positive value".to_string(),
            }
            .into());
        }

        Ok(scenarios
            .iter()
            .map(|s| ResolvedScenario {
                name: s.name.clone(),
                weight: s.weight / total_weight,
                multipliers: channels.iter().map(|c| s.multiplier_for(c)).collect(),
            })
            .collect())
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn curves(&self) -> &[HillCurve] {
        &self.curves
    }

    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    pub fn budget(&self) -> f64 {
        self.budget
    }

    pub fn scenarios(&self) -> &[ResolvedScenario] {
        &self.scenarios
    }

    /// Scenario-weighted response multiplier per channel
    pub fn blended_multipliers(&self) -> &[f64] {
        &self.blended
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Map named spend onto problem order; unknown channels are rejected and
    /// missing channels count as zero spend
    pub fn genes_from_map(&self, spend: &HashMap<String, f64>) -> Result<Vec<f64>> {
        if let Some(unknown) = spend.keys().find(|c| !self.channels.contains(c)) {
            return Err(OptimizeError::InvalidAllocation(format!(
                "unknown channel: {}",
                unknown
            ))
            .into());
        }
        let genes: Vec<f64> = self
            .channels
            .iter()
            .map(|c| spend.get(c).copied().unwrap_or(0.0))
            .collect();
        if genes.iter().any(|g| !g.is_finite() || *g < 0.0) {
            return Err(OptimizeError::InvalidAllocation(
                "spend must be finite and non-negative".to_string(),
            )
            .into());
        }
        Ok(genes)
    }

    /// Report lines for an allocation in problem order
    pub fn report_entries<'a>(&'a self, genes: &[f64]) -> Vec<ReportEntry<'a>> {
        self.channels
            .iter()
            .zip(&self.curves)
            .zip(genes.iter().zip(&self.blended))
            .map(|((channel, curve), (&spend, &multiplier))| ReportEntry {
                channel: channel.as_str(),
                curve,
                spend,
                multiplier,
            })
            .collect()
    }
}

//! Fitness: scenario-weighted ROI plus a diversification bonus
//!
//! ```text
//! fitness = Σ_s ŵ_s · ROI_s(x) + λ · D(x)
//! ROI_s(x) = (Σ_i m_{s,i} · r_i(x_i) − Σ_i x_i) / Σ_i x_i
//! D(x)     = −Σ_i p_i ln p_i / ln n,   p_i = x_i / Σ x
//! ```
//!
//! Because the scenario weights sum to 1, the weighted ROI collapses to a
//! single pass using the blended multipliers `Σ_s ŵ_s · m_{s,i}`.

use serde::{Deserialize, Serialize};

use crate::problem::AllocationProblem;

/// Components of one fitness evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessBreakdown {
    pub fitness: f64,
    /// Scenario-weighted ROI
    pub roi: f64,
    /// Normalized spend entropy (0.0 - 1.0)
    pub diversification: f64,
    /// Scenario-weighted revenue
    pub expected_revenue: f64,
}

/// Outcome of an allocation under one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub weight: f64,
    pub expected_revenue: f64,
    pub roi: f64,
}

/// Evaluates allocations against a problem
pub struct FitnessEvaluator<'a> {
    problem: &'a AllocationProblem,
    diversification_weight: f64,
}

impl<'a> FitnessEvaluator<'a> {
    pub fn new(problem: &'a AllocationProblem, diversification_weight: f64) -> Self {
        Self {
            problem,
            diversification_weight,
        }
    }

    /// Fitness value only; called once per individual per generation
    #[inline]
    pub fn fitness(&self, genes: &[f64]) -> f64 {
        self.breakdown(genes).fitness
    }

    pub fn breakdown(&self, genes: &[f64]) -> FitnessBreakdown {
        let spend: f64 = genes.iter().sum();
        let revenue: f64 = self
            .problem
            .curves()
            .iter()
            .zip(self.problem.blended_multipliers())
            .zip(genes)
            .map(|((curve, m), &x)| m * curve.response(x))
            .sum();

        let roi = roi(revenue, spend);
        let diversification = diversification(genes, spend);

        FitnessBreakdown {
            fitness: roi + self.diversification_weight * diversification,
            roi,
            diversification,
            expected_revenue: revenue,
        }
    }

    /// ROI and revenue under each scenario separately
    pub fn scenario_outcomes(&self, genes: &[f64]) -> Vec<ScenarioOutcome> {
        let spend: f64 = genes.iter().sum();
        self.problem
            .scenarios()
            .iter()
            .map(|scenario| {
                let revenue: f64 = self
                    .problem
                    .curves()
                    .iter()
                    .zip(&scenario.multipliers)
                    .zip(genes)
                    .map(|((curve, m), &x)| m * curve.response(x))
                    .sum();
                ScenarioOutcome {
                    name: scenario.name.clone(),
                    weight: scenario.weight,
                    expected_revenue: revenue,
                    roi: roi(revenue, spend),
                }
            })
            .collect()
    }
}

fn roi(revenue: f64, spend: f64) -> f64 {
    if spend <= 0.0 {
        return 0.0;
    }
    (revenue - spend) / spend
}

/// Normalized Shannon entropy of spend shares
pub fn diversification(genes: &[f64], total: f64) -> f64 {
    if genes.len() < 2 || total <= 0.0 {
        return 0.0;
    }
    let entropy: f64 = genes
        .iter()
        .filter(|x| **x > 0.0)
        .map(|x| {
            let p = x / total;
            -p * p.ln()
        })
        .sum();
    (entropy / (genes.len() as f64).ln()).clamp(0.0, 1.0)
}

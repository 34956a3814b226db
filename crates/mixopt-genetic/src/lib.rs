//! # Genetic
//!
//! Genetic budget allocation optimizer for MixOpt.
//!
//! ## Fitness Formula
//!
//! ```text
//! fitness = Σ_s ŵ_s · ROI_s(x) + λ · D(x)
//! ```
//!
//! Where:
//! - ŵ_s: normalized scenario weight
//! - ROI_s: (revenue − spend) / spend under scenario s, revenue from fitted Hill curves
//! - D: normalized entropy of spend shares (diversification bonus)
//! - λ: diversification weight
//!
//! ## Search
//!
//! Tournament selection, blend crossover, bounded uniform mutation and
//! elitism over allocations that always satisfy the per-channel bounds and
//! spend the whole budget. A PID controller adapts the mutation scale to
//! hold population diversity near a target, and the search stops once the
//! best fitness stalls for `patience` generations.

pub mod controller;
pub mod convergence;
pub mod fitness;
pub mod optimizer;
pub mod population;
pub mod problem;
pub mod repair;
pub mod result;

use mixopt_common::{OptimizeError, DEFAULT_DIVERSIFICATION_WEIGHT, DEFAULT_GENERATIONS, DEFAULT_POPULATION_SIZE};
use serde::{Deserialize, Serialize};

pub use fitness::{FitnessBreakdown, FitnessEvaluator, ScenarioOutcome};
pub use optimizer::BudgetAllocationOptimizer;
pub use problem::AllocationProblem;
pub use result::{AllocationEvaluation, BaselineComparison, GenerationStats, OptimizationResult};

/// Genetic optimizer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Individuals per generation
    pub population_size: usize,
    /// Generation cap
    pub generations: usize,
    /// Individuals compared per tournament
    pub tournament_size: usize,
    /// Probability a child is bred by crossover rather than cloned
    pub crossover_rate: f64,
    /// Per-gene mutation probability
    pub mutation_rate: f64,
    /// Mutation amplitude as a fraction of each channel's range
    pub mutation_scale: f64,
    /// Best individuals carried over unchanged
    pub elite_count: usize,
    /// Weight λ of the diversification bonus
    pub diversification_weight: f64,
    /// Population diversity the mutation controller aims for
    pub target_diversity: f64,
    /// Let the PID controller adjust the mutation scale
    pub adaptive_mutation: bool,
    /// Generations without improvement before stopping
    pub patience: usize,
    /// Minimum fitness gain that counts as improvement
    pub tolerance: f64,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            population_size: DEFAULT_POPULATION_SIZE,
            generations: DEFAULT_GENERATIONS,
            tournament_size: 3,
            crossover_rate: 0.8,
            mutation_rate: 0.1,
            mutation_scale: 0.1,
            elite_count: 2,
            diversification_weight: DEFAULT_DIVERSIFICATION_WEIGHT,
            target_diversity: 0.05,
            adaptive_mutation: true,
            patience: 40,
            tolerance: 1e-7,
            seed: None,
        }
    }
}

impl OptimizerConfig {
    pub fn validate(&self) -> Result<(), OptimizeError> {
        let invalid = |msg: &str| Err(OptimizeError::InvalidConfig(msg.to_string()));

        if self.population_size < 2 {
            return invalid("population_size must be at least 2");
        }
        if self.generations == 0 {
            return invalid("generations must be at least 1");
        }
        if self.tournament_size == 0 || self.tournament_size > self.population_size {
            return invalid("tournament_size must be between 1 and population_size");
        }
        if self.elite_count >= self.population_size {
            return invalid("elite_count must be smaller than population_size");
        }
        for (name, rate) in [
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(OptimizeError::InvalidConfig(format!(
                    "{} must be within [0, 1]",
                    name
                )));
            }
        }
        for (name, value) in [
            ("mutation_scale", self.mutation_scale),
            ("diversification_weight", self.diversification_weight),
            ("target_diversity", self.target_diversity),
            ("tolerance", self.tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(OptimizeError::InvalidConfig(format!(
                    "{} must be finite and non-negative",
                    name
                )));
            }
        }
        if self.patience == 0 {
            return invalid("patience must be at least 1");
        }
        Ok(())
    }
}

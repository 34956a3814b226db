//! Optimization output types

use chrono::{DateTime, Utc};
use mixopt_common::AllocationReport;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fitness::{FitnessBreakdown, ScenarioOutcome};

/// Per-generation search statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    pub diversity: f64,
    pub mutation_scale: f64,
}

/// How the optimized split compares with a caller-supplied allocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineComparison {
    pub baseline: AllocationReport,
    pub baseline_fitness: f64,
    /// Optimized expected revenue minus baseline expected revenue
    pub revenue_lift: f64,
    /// Relative revenue change; 0 when the baseline earns nothing
    pub revenue_lift_pct: f64,
    pub fitness_lift: f64,
}

/// Scored allocation without search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationEvaluation {
    pub report: AllocationReport,
    pub fitness: FitnessBreakdown,
    pub scenarios: Vec<ScenarioOutcome>,
    /// Whether the allocation satisfies every bound and spends the full budget
    pub feasible: bool,
}

/// Result of a genetic budget search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub run_id: Uuid,
    pub report: AllocationReport,
    pub fitness: FitnessBreakdown,
    pub scenarios: Vec<ScenarioOutcome>,
    pub generations_run: usize,
    /// Stopped by the convergence policy rather than the generation cap
    pub converged: bool,
    pub baseline: Option<BaselineComparison>,
    pub history: Vec<GenerationStats>,
    pub computed_at: DateTime<Utc>,
}

impl OptimizationResult {
    /// Best fitness seen in any recorded generation
    pub fn best_recorded_fitness(&self) -> f64 {
        self.history
            .iter()
            .map(|g| g.best_fitness)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

//! Genetic search over budget allocations

use std::collections::HashMap;

use chrono::Utc;
use mixopt_common::{AllocationReport, MixError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::controller::MutationController;
use crate::convergence::ConvergencePolicy;
use crate::fitness::FitnessEvaluator;
use crate::population::operators::{blend_crossover, mutate, tournament};
use crate::population::{Individual, Population};
use crate::problem::AllocationProblem;
use crate::repair::{is_feasible, repair};
use crate::result::{AllocationEvaluation, BaselineComparison, GenerationStats, OptimizationResult};
use crate::OptimizerConfig;

/// Searches for the allocation maximizing scenario-weighted fitness
#[derive(Debug, Clone, Default)]
pub struct BudgetAllocationOptimizer {
    config: OptimizerConfig,
}

impl BudgetAllocationOptimizer {
    pub fn new(config: OptimizerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Run the genetic search
    #[instrument(skip(self, problem), fields(channels = problem.len(), budget = problem.budget()))]
    pub fn optimize(&self, problem: &AllocationProblem) -> Result<OptimizationResult> {
        self.run(problem, None)
    }

    /// Run the genetic search and compare the winner with a current allocation
    #[instrument(skip(self, problem, baseline), fields(channels = problem.len(), budget = problem.budget()))]
    pub fn optimize_with_baseline(
        &self,
        problem: &AllocationProblem,
        baseline: &HashMap<String, f64>,
    ) -> Result<OptimizationResult> {
        let genes = problem.genes_from_map(baseline)?;
        self.run(problem, Some(genes))
    }

    /// Score an allocation as given, without searching or repairing it
    pub fn evaluate(
        &self,
        problem: &AllocationProblem,
        spend: &HashMap<String, f64>,
    ) -> Result<AllocationEvaluation> {
        let genes = problem.genes_from_map(spend)?;
        let evaluator = FitnessEvaluator::new(problem, self.config.diversification_weight);
        let tolerance = 1e-6 * problem.budget().max(1.0);

        Ok(AllocationEvaluation {
            report: AllocationReport::build(&problem.report_entries(&genes)),
            fitness: evaluator.breakdown(&genes),
            scenarios: evaluator.scenario_outcomes(&genes),
            feasible: is_feasible(
                &genes,
                problem.lower(),
                problem.upper(),
                problem.budget(),
                tolerance,
            ),
        })
    }

    fn run(
        &self,
        problem: &AllocationProblem,
        baseline: Option<Vec<f64>>,
    ) -> Result<OptimizationResult> {
        let config = &self.config;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let evaluator = FitnessEvaluator::new(problem, config.diversification_weight);
        let mut population =
            Population::initialize(problem, config.population_size, &evaluator, &mut rng);

        let mut controller = config
            .adaptive_mutation
            .then(|| MutationController::new(config.mutation_scale, config.target_diversity));
        let mut policy = ConvergencePolicy::new(config.tolerance, config.patience);
        let mut mutation_scale = config.mutation_scale;
        let mut history = Vec::with_capacity(config.generations);
        let mut converged = false;
        // Best individual seen in any generation; without elites a later
        // population can lose it
        let mut champion = Self::best_of(&population)?.clone();

        for generation in 0..config.generations {
            let best_fitness = Self::best_of(&population)?.fitness;
            let diversity = population.diversity(problem.lower(), problem.upper());
            let stats = GenerationStats {
                generation,
                best_fitness,
                mean_fitness: population.mean_fitness(),
                diversity,
                mutation_scale,
            };
            debug!(
                generation,
                best = stats.best_fitness,
                mean = stats.mean_fitness,
                diversity,
                mutation_scale,
                "Generation evaluated"
            );
            history.push(stats);

            if policy.observe(best_fitness) {
                converged = true;
                break;
            }

            if let Some(controller) = controller.as_mut() {
                mutation_scale = controller.update(diversity);
            }

            population = self.breed(problem, &population, &evaluator, mutation_scale, &mut rng);
            let contender = Self::best_of(&population)?;
            if contender.fitness > champion.fitness {
                champion = contender.clone();
            }
        }

        let best = &champion;
        let report = AllocationReport::build(&problem.report_entries(&best.genes));
        let fitness = evaluator.breakdown(&best.genes);

        let baseline = baseline.map(|genes| {
            let baseline_report = AllocationReport::build(&problem.report_entries(&genes));
            let baseline_fitness = evaluator.fitness(&genes);
            let revenue_lift = report.expected_revenue - baseline_report.expected_revenue;
            let revenue_lift_pct = if baseline_report.expected_revenue > 0.0 {
                revenue_lift / baseline_report.expected_revenue
            } else {
                0.0
            };
            BaselineComparison {
                baseline: baseline_report,
                baseline_fitness,
                revenue_lift,
                revenue_lift_pct,
                fitness_lift: fitness.fitness - baseline_fitness,
            }
        });

        info!(
            generations = history.len(),
            converged,
            fitness = fitness.fitness,
            roi = fitness.roi,
            expected_revenue = fitness.expected_revenue,
            "Budget optimization finished"
        );

        Ok(OptimizationResult {
            run_id: Uuid::now_v7(),
            report,
            fitness,
            scenarios: evaluator.scenario_outcomes(&best.genes),
            generations_run: history.len(),
            converged,
            baseline,
            history,
            computed_at: Utc::now(),
        })
    }

    /// Next generation: elites, then tournament-selected children
    fn breed(
        &self,
        problem: &AllocationProblem,
        population: &Population,
        evaluator: &FitnessEvaluator<'_>,
        mutation_scale: f64,
        rng: &mut StdRng,
    ) -> Population {
        let config = &self.config;
        let parents = population.individuals();
        let elites = config.elite_count.min(parents.len());

        let mut next: Vec<Individual> = parents[..elites].to_vec();
        while next.len() < config.population_size {
            let first = tournament(parents, config.tournament_size, rng);
            let mut genes = if rng.gen::<f64>() < config.crossover_rate {
                let second = tournament(parents, config.tournament_size, rng);
                blend_crossover(&first.genes, &second.genes, rng)
            } else {
                first.genes.clone()
            };

            mutate(
                &mut genes,
                config.mutation_rate,
                mutation_scale,
                problem.lower(),
                problem.upper(),
                rng,
            );
            repair(&mut genes, problem.lower(), problem.upper(), problem.budget());
            next.push(Individual::evaluated(genes, evaluator));
        }

        let mut population = Population::new(next);
        population.sort();
        population
    }

    fn best_of(population: &Population) -> Result<&Individual> {
        population
            .best()
            .ok_or_else(|| MixError::Internal("empty population".to_string()))
    }
}

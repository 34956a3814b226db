//! Population of candidate allocations
pub mod operators;
pub mod seeding;

use ordered_float::OrderedFloat;
use rand::Rng;
use std::cmp::Reverse;

use crate::fitness::FitnessEvaluator;
use crate::problem::AllocationProblem;

/// A candidate allocation with its cached fitness
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    pub genes: Vec<f64>,
    pub fitness: f64,
}

impl Individual {
    pub fn evaluated(genes: Vec<f64>, evaluator: &FitnessEvaluator<'_>) -> Self {
        let fitness = evaluator.fitness(&genes);
        Self { genes, fitness }
    }
}

/// Population ordered best-first after [`Population::sort`]
#[derive(Debug, Clone)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    pub fn new(individuals: Vec<Individual>) -> Self {
        Self { individuals }
    }

    /// Heuristic seeds followed by random feasible individuals
    pub fn initialize<R: Rng + ?Sized>(
        problem: &AllocationProblem,
        size: usize,
        evaluator: &FitnessEvaluator<'_>,
        rng: &mut R,
    ) -> Self {
        let mut individuals: Vec<Individual> = seeding::heuristic_seeds(problem)
            .into_iter()
            .take(size)
            .map(|genes| Individual::evaluated(genes, evaluator))
            .collect();

        while individuals.len() < size {
            let genes = seeding::random_feasible(problem, rng);
            individuals.push(Individual::evaluated(genes, evaluator));
        }

        let mut population = Self { individuals };
        population.sort();
        population
    }

    /// Order best-first
    pub fn sort(&mut self) {
        self.individuals
            .sort_by_key(|i| Reverse(OrderedFloat(i.fitness)));
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Best individual; the population must be sorted
    pub fn best(&self) -> Option<&Individual> {
        self.individuals.first()
    }

    pub fn mean_fitness(&self) -> f64 {
        if self.individuals.is_empty() {
            return 0.0;
        }
        self.individuals.iter().map(|i| i.fitness).sum::<f64>() / self.individuals.len() as f64
    }

    /// Mean per-channel standard deviation of spend, relative to each
    /// channel's feasible range
    ///
    /// Channels with a zero-width range are skipped. 0.0 means every
    /// individual is identical.
    pub fn diversity(&self, lower: &[f64], upper: &[f64]) -> f64 {
        let n = self.individuals.len();
        if n < 2 {
            return 0.0;
        }

        let mut total = 0.0;
        let mut counted = 0usize;
        for (channel, (lo, hi)) in lower.iter().zip(upper).enumerate() {
            let range = hi - lo;
            if range <= 0.0 {
                continue;
            }
            let mean = self.individuals.iter().map(|i| i.genes[channel]).sum::<f64>() / n as f64;
            let variance = self
                .individuals
                .iter()
                .map(|i| (i.genes[channel] - mean).powi(2))
                .sum::<f64>()
                / n as f64;
            total += variance.sqrt() / range;
            counted += 1;
        }

        if counted == 0 {
            0.0
        } else {
            total / counted as f64
        }
    }
}

//! Initial individuals

use rand::Rng;

use crate::problem::AllocationProblem;
use crate::repair::repair;

/// Increments used by the marginal-greedy seed
const GREEDY_STEPS: usize = 200;

/// Deterministic starting points: even split, headroom-proportional split,
/// and a greedy marginal-return fill
pub fn heuristic_seeds(problem: &AllocationProblem) -> Vec<Vec<f64>> {
    vec![
        even_split(problem),
        headroom_split(problem),
        marginal_greedy(problem),
    ]
}

/// Same spend on every channel, repaired onto the bounds
pub fn even_split(problem: &AllocationProblem) -> Vec<f64> {
    let share = problem.budget() / problem.len() as f64;
    let mut genes = vec![share; problem.len()];
    repair(&mut genes, problem.lower(), problem.upper(), problem.budget());
    genes
}

/// Minimums first, then the remainder in proportion to each channel's headroom
pub fn headroom_split(problem: &AllocationProblem) -> Vec<f64> {
    let mut genes = problem.lower().to_vec();
    repair(&mut genes, problem.lower(), problem.upper(), problem.budget());
    genes
}

/// Minimums first, then fixed increments to whichever channel currently has
/// the highest scenario-weighted marginal return
pub fn marginal_greedy(problem: &AllocationProblem) -> Vec<f64> {
    let lower = problem.lower();
    let upper = problem.upper();
    let mut genes = lower.to_vec();
    let remaining = problem.budget() - lower.iter().sum::<f64>();
    if remaining <= 0.0 {
        repair(&mut genes, lower, upper, problem.budget());
        return genes;
    }

    let increment = remaining / GREEDY_STEPS as f64;
    let mut left = remaining;
    let mut steps = 0;
    // Capped channels can absorb less than a full increment, so allow extra steps
    while left > 1e-9 * problem.budget() && steps < GREEDY_STEPS * 4 {
        steps += 1;
        let best = (0..genes.len())
            .filter(|&i| upper[i] - genes[i] > 1e-12)
            .map(|i| {
                let gain = problem.blended_multipliers()[i]
                    * problem.curves()[i].marginal_response(genes[i]);
                (i, gain)
            })
            .max_by(|a, b| a.1.total_cmp(&b.1));

        match best {
            Some((i, _)) => {
                let step = increment.min(left).min(upper[i] - genes[i]);
                genes[i] += step;
                left -= step;
            }
            None => break,
        }
    }

    repair(&mut genes, lower, upper, problem.budget());
    genes
}

/// Uniformly random shares of the discretionary budget, repaired
pub fn random_feasible<R: Rng + ?Sized>(problem: &AllocationProblem, rng: &mut R) -> Vec<f64> {
    let lower = problem.lower();
    let discretionary = problem.budget() - lower.iter().sum::<f64>();

    let weights: Vec<f64> = (0..problem.len()).map(|_| rng.gen::<f64>()).collect();
    let total: f64 = weights.iter().sum();

    let mut genes: Vec<f64> = lower
        .iter()
        .zip(&weights)
        .map(|(lo, w)| {
            if total > 0.0 {
                lo + discretionary * w / total
            } else {
                *lo
            }
        })
        .collect();
    repair(&mut genes, lower, problem.upper(), problem.budget());
    genes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repair::is_feasible;
    use mixopt_common::{ChannelConstraint, HillCurve};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn problem() -> AllocationProblem {
        let curves = HashMap::from([
            ("strong".to_string(), HillCurve::new(5000.0, 200.0, 1.0).unwrap()),
            ("weak".to_string(), HillCurve::new(500.0, 200.0, 1.0).unwrap()),
            ("capped".to_string(), HillCurve::new(3000.0, 100.0, 1.0).unwrap()),
        ]);
        let constraints = [
            ChannelConstraint::new("strong"),
            ChannelConstraint::new("weak").with_min(50.0),
            ChannelConstraint::new("capped").with_max(100.0),
        ];
        AllocationProblem::new(&curves, &constraints, 600.0, &[]).unwrap()
    }

    fn feasible(problem: &AllocationProblem, genes: &[f64]) -> bool {
        is_feasible(genes, problem.lower(), problem.upper(), problem.budget(), 1e-6)
    }

    #[test]
    fn test_heuristic_seeds_are_feasible() {
        let problem = problem();
        for seed in heuristic_seeds(&problem) {
            assert!(feasible(&problem, &seed), "{seed:?}");
        }
    }

    #[test]
    fn test_greedy_prefers_strong_channel() {
        let problem = problem();
        let genes = marginal_greedy(&problem);
        assert!(genes[0] > genes[1]);
        assert!((genes[1] - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_random_feasible() {
        let problem = problem();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let genes = random_feasible(&problem, &mut rng);
            assert!(feasible(&problem, &genes));
        }
    }
}

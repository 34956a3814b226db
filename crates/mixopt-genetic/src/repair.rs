//! Feasibility repair
//!
//! Clamps genes into their bounds, then spreads the residual
//! `budget - Σ genes` across channels in proportion to the slack each has
//! in the direction of the residual.

/// Redistribution passes before giving up on rounding residue
const MAX_PASSES: usize = 16;

/// Project `genes` onto `{ lower ≤ g ≤ upper, Σ g = budget }`
///
/// Assumes `Σ lower ≤ budget ≤ Σ upper`, which problem construction enforces.
pub fn repair(genes: &mut [f64], lower: &[f64], upper: &[f64], budget: f64) {
    clamp(genes, lower, upper);
    let tolerance = 1e-9 * budget.max(1.0);

    for _ in 0..MAX_PASSES {
        let residual = budget - genes.iter().sum::<f64>();
        if residual.abs() <= tolerance {
            return;
        }

        let slack: Vec<f64> = if residual > 0.0 {
            genes.iter().zip(upper).map(|(g, u)| u - g).collect()
        } else {
            genes.iter().zip(lower).map(|(g, l)| g - l).collect()
        };
        let total_slack: f64 = slack.iter().sum();
        if total_slack <= 0.0 {
            return;
        }

        for (gene, s) in genes.iter_mut().zip(&slack) {
            *gene += residual * s / total_slack;
        }
        clamp(genes, lower, upper);
    }
}

fn clamp(genes: &mut [f64], lower: &[f64], upper: &[f64]) {
    for ((gene, &lo), &hi) in genes.iter_mut().zip(lower).zip(upper) {
        *gene = if gene.is_finite() { gene.clamp(lo, hi) } else { lo };
    }
}

/// Whether `genes` satisfy bounds and the budget within `tolerance`
pub fn is_feasible(genes: &[f64], lower: &[f64], upper: &[f64], budget: f64, tolerance: f64) -> bool {
    let in_bounds = genes
        .iter()
        .zip(lower.iter().zip(upper))
        .all(|(g, (lo, hi))| *g >= lo - tolerance && *g <= hi + tolerance);
    in_bounds && (genes.iter().sum::<f64>() - budget).abs() <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_scales_up_to_budget() {
        let mut genes = vec![10.0, 10.0];
        repair(&mut genes, &[0.0, 0.0], &[100.0, 100.0], 100.0);
        assert!((genes[0] - 50.0).abs() < 1e-9);
        assert!((genes[1] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_respects_upper_bound() {
        let mut genes = vec![90.0, 0.0];
        repair(&mut genes, &[0.0, 0.0], &[40.0, 100.0], 100.0);
        assert!((genes[0] - 40.0).abs() < 1e-9);
        assert!((genes[1] - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_respects_lower_bound_when_shrinking() {
        let mut genes = vec![80.0, 80.0];
        repair(&mut genes, &[30.0, 0.0], &[100.0, 100.0], 100.0);
        assert!(genes[0] >= 30.0 - 1e-9);
        assert!((genes.iter().sum::<f64>() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_non_finite_gene_reset_to_lower() {
        let mut genes = vec![f64::NAN, 20.0];
        repair(&mut genes, &[5.0, 0.0], &[100.0, 100.0], 50.0);
        assert!(is_feasible(&genes, &[5.0, 0.0], &[100.0, 100.0], 50.0, 1e-6));
    }

    proptest! {
        #[test]
        fn prop_repair_is_feasible(
            bounds in prop::collection::vec((0.0f64..50.0, 0.0f64..200.0), 1..8),
            raw in prop::collection::vec(-100.0f64..400.0, 8),
            t in 0.0f64..1.0,
        ) {
            let lower: Vec<f64> = bounds.iter().map(|(lo, _)| *lo).collect();
            let upper: Vec<f64> = bounds.iter().map(|(lo, width)| lo + width).collect();
            let min_total: f64 = lower.iter().sum();
            let max_total: f64 = upper.iter().sum();
            let budget = min_total + t * (max_total - min_total);
            prop_assume!(budget > 0.0);

            let mut genes: Vec<f64> = raw[..lower.len()].to_vec();
            repair(&mut genes, &lower, &upper, budget);
            prop_assert!(is_feasible(&genes, &lower, &upper, budget, 1e-6 * budget.max(1.0)));
        }
    }
}

//! End-to-end: fit curves from history, then allocate a budget across them

use std::collections::HashMap;

use mixopt_common::{ChannelConstraint, ChannelHistory, HillCurve, Scenario};
use mixopt_genetic::{AllocationProblem, BudgetAllocationOptimizer, OptimizerConfig};
use mixopt_saturation::SaturationCurveFitter;

/// Weekly history sampled from known curves with a small deterministic wobble
fn history(channel: &str, truth: &HillCurve, max_spend: f64) -> ChannelHistory {
    let pairs: Vec<(f64, f64)> = (1..=20)
        .map(|week| {
            let spend = max_spend * week as f64 / 20.0;
            let wobble = 1.0 + 0.02 * ((week % 3) as f64 - 1.0);
            (spend, truth.response(spend) * wobble)
        })
        .collect();
    ChannelHistory::from_pairs(channel, &pairs)
}

fn fitted_curves() -> HashMap<String, HillCurve> {
    let histories = vec![
        history("search", &HillCurve::new(50_000.0, 10_000.0, 1.1).unwrap(), 20_000.0),
        history("social", &HillCurve::new(30_000.0, 8_000.0, 1.4).unwrap(), 15_000.0),
        history("display", &HillCurve::new(8_000.0, 6_000.0, 1.0).unwrap(), 10_000.0),
    ];

    let fitted = SaturationCurveFitter::default().fit_all(&histories).unwrap();
    for curve in &fitted {
        assert!(
            curve.fit.r_squared > 0.95,
            "{} r² = {}",
            curve.channel,
            curve.fit.r_squared
        );
    }
    fitted.into_iter().map(|f| (f.channel, f.curve)).collect()
}

#[test]
fn test_fit_then_optimize_respects_constraints() {
    let curves = fitted_curves();
    let constraints = [
        ChannelConstraint::new("search").with_min(2_000.0).with_max(14_000.0),
        ChannelConstraint::new("social").with_min(1_000.0),
        ChannelConstraint::new("display").with_max(2_500.0),
    ];
    let problem =
        AllocationProblem::new(&curves, &constraints, 20_000.0, &Scenario::standard_set())
            .unwrap();

    let optimizer = BudgetAllocationOptimizer::new(OptimizerConfig {
        population_size: 60,
        generations: 120,
        seed: Some(2024),
        ..Default::default()
    })
    .unwrap();

    let current = HashMap::from([
        ("search".to_string(), 6_000.0),
        ("social".to_string(), 6_000.0),
        ("display".to_string(), 8_000.0),
    ]);
    let result = optimizer.optimize_with_baseline(&problem, &current).unwrap();

    let search = result.report.spend_for("search").unwrap();
    let social = result.report.spend_for("social").unwrap();
    let display = result.report.spend_for("display").unwrap();

    assert!((2_000.0 - 0.01..=14_000.0 + 0.01).contains(&search));
    assert!(social >= 1_000.0 - 0.01);
    assert!(display <= 2_500.0 + 0.01);
    assert!((search + social + display - 20_000.0).abs() < 0.05);

    // Display saturates early and is capped; the search should beat the
    // display-heavy current split
    let comparison = result.baseline.as_ref().unwrap();
    assert!(comparison.revenue_lift > 0.0);
    assert!(result.fitness.roi > comparison.baseline.expected_roi);
    assert!(result.generations_run <= 120);
}

#[test]
fn test_result_serializes() {
    let curves = fitted_curves();
    let problem = AllocationProblem::new(&curves, &[], 10_000.0, &[]).unwrap();
    let optimizer = BudgetAllocationOptimizer::new(OptimizerConfig {
        population_size: 20,
        generations: 10,
        seed: Some(7),
        ..Default::default()
    })
    .unwrap();
    let result = optimizer.optimize(&problem).unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["report"]["allocations"].as_array().unwrap().len(), 3);
    assert!(json["run_id"].is_string());
    assert_eq!(json["generations_run"], result.history.len());
}

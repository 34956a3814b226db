//! Gradient-descent Hill curve fitter

use std::collections::HashSet;

use mixopt_common::{
    ChannelHistory, FitDiagnostics, FitError, FittedCurve, HillCurve, Result, MIN_OBSERVATIONS,
};
use tracing::{debug, instrument, warn};

use crate::gradient::{loss, loss_gradient, Params};
use crate::FitterConfig;

/// Parameter bounds in normalized units: (alpha, beta, gamma)
const LOWER: Params = [1e-6, 1e-4, 0.1];
const UPPER: Params = [100.0, 10.0, 5.0];

/// Step size below which the search is considered stuck
const MIN_LEARNING_RATE: f64 = 1e-12;

/// Fits Hill saturation curves from spend/revenue history
#[derive(Debug, Clone, Default)]
pub struct SaturationCurveFitter {
    config: FitterConfig,
}

/// Normalized training data for one channel
struct Normalized {
    xs: Vec<f64>,
    ys: Vec<f64>,
    spend_scale: f64,
    revenue_scale: f64,
}

impl SaturationCurveFitter {
    pub fn new(config: FitterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FitterConfig {
        &self.config
    }

    /// Fit one channel
    #[instrument(skip(self, history), fields(channel = %history.channel, observations = history.len()))]
    pub fn fit(&self, history: &ChannelHistory) -> Result<FittedCurve> {
        let data = Self::normalize(history)?;

        let mut params = Self::initial_guess(&data);
        let mut current = loss(&params, &data.xs, &data.ys);
        let mut lr = self.config.learning_rate;
        let max_lr = self.config.learning_rate * 100.0;
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.config.max_iterations {
            iterations += 1;

            let grad = loss_gradient(&params, &data.xs, &data.ys);
            if grad.iter().any(|g| !g.is_finite()) {
                return Err(FitError::Diverged {
                    channel: history.channel.clone(),
                }
                .into());
            }

            let candidate = Self::project([
                params[0] - lr * grad[0],
                params[1] - lr * grad[1],
                params[2] - lr * grad[2],
            ]);
            let next = loss(&candidate, &data.xs, &data.ys);

            if !next.is_finite() || next > current {
                lr *= 0.5;
                if lr < MIN_LEARNING_RATE {
                    // No step of any usable size lowers the loss: a
                    // stationary point inside the bounds
                    converged = true;
                    break;
                }
                continue;
            }

            let improvement = (current - next) / current.max(f64::MIN_POSITIVE);
            params = candidate;
            current = next;
            lr = (lr * 1.05).min(max_lr);

            if current <= f64::EPSILON * f64::EPSILON || improvement < self.config.tolerance {
                converged = true;
                break;
            }
        }

        let curve = HillCurve::new(
            params[0] * data.revenue_scale,
            params[1] * data.spend_scale,
            params[2],
        )?;
        let (r_squared, rmse) = Self::goodness_of_fit(&curve, history);

        if !converged {
            warn!(iterations, loss = current, "Curve fit hit the iteration cap");
        }
        debug!(
            alpha = curve.alpha,
            beta = curve.beta,
            gamma = curve.gamma,
            r_squared,
            iterations,
            "Fitted saturation curve"
        );

        Ok(FittedCurve {
            channel: history.channel.clone(),
            curve,
            fit: FitDiagnostics {
                r_squared,
                rmse,
                iterations,
                converged,
                final_loss: current,
                observations: history.len(),
            },
        })
    }

    /// Fit several channels; channel names must be unique
    #[instrument(skip(self, histories), fields(channels = histories.len()))]
    pub fn fit_all(&self, histories: &[ChannelHistory]) -> Result<Vec<FittedCurve>> {
        let mut seen = HashSet::new();
        for history in histories {
            if !seen.insert(history.channel.as_str()) {
                return Err(FitError::DuplicateChannel(history.channel.clone()).into());
            }
        }
        histories.iter().map(|h| self.fit(h)).collect()
    }

    fn normalize(history: &ChannelHistory) -> std::result::Result<Normalized, FitError> {
        if history.len() < MIN_OBSERVATIONS {
            return Err(FitError::InsufficientData {
                channel: history.channel.clone(),
                got: history.len(),
                required: MIN_OBSERVATIONS,
            });
        }

        for (index, obs) in history.observations.iter().enumerate() {
            let reason = if !obs.spend.is_finite() || !obs.revenue.is_finite() {
                Some("values must be finite")
            } else if obs.spend < 0.0 || obs.revenue < 0.0 {
                Some("values must be non-negative")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(FitError::InvalidObservation {
                    channel: history.channel.clone(),
                    index,
                    reason: reason.to_string(),
                });
            }
        }

        let spend_scale = history
            .observations
            .iter()
            .map(|o| o.spend)
            .fold(0.0, f64::max);
        if spend_scale <= 0.0 {
            return Err(FitError::ZeroSpend {
                channel: history.channel.clone(),
            });
        }

        let max_revenue = history
            .observations
            .iter()
            .map(|o| o.revenue)
            .fold(0.0, f64::max);
        let revenue_scale = if max_revenue > 0.0 { max_revenue } else { 1.0 };

        Ok(Normalized {
            xs: history.observations.iter().map(|o| o.spend / spend_scale).collect(),
            ys: history
                .observations
                .iter()
                .map(|o| o.revenue / revenue_scale)
                .collect(),
            spend_scale,
            revenue_scale,
        })
    }

    fn initial_guess(data: &Normalized) -> Params {
        let max_y = data.ys.iter().copied().fold(0.0, f64::max);

        let mut positive: Vec<f64> = data.xs.iter().copied().filter(|x| *x > 0.0).collect();
        positive.sort_by(|a, b| a.total_cmp(b));
        let median = positive.get(positive.len() / 2).copied().unwrap_or(0.5);

        Self::project([(1.2 * max_y).max(0.1), median, 1.0])
    }

    fn project(p: Params) -> Params {
        [
            p[0].clamp(LOWER[0], UPPER[0]),
            p[1].clamp(LOWER[1], UPPER[1]),
            p[2].clamp(LOWER[2], UPPER[2]),
        ]
    }

    /// (R², RMSE) in original units
    fn goodness_of_fit(curve: &HillCurve, history: &ChannelHistory) -> (f64, f64) {
        let n = history.len() as f64;
        let mean = history.total_revenue() / n;

        let (ss_res, ss_tot) = history
            .observations
            .iter()
            .fold((0.0, 0.0), |(res, tot), o| {
                let predicted = curve.response(o.spend);
                (
                    res + (o.revenue - predicted).powi(2),
                    tot + (o.revenue - mean).powi(2),
                )
            });

        let r_squared = if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else if ss_res <= f64::EPSILON {
            1.0
        } else {
            0.0
        };
        (r_squared, (ss_res / n).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixopt_common::MixError;
    use proptest::prelude::*;

    fn synthetic(channel: &str, curve: &HillCurve, spends: &[f64]) -> ChannelHistory {
        let pairs: Vec<(f64, f64)> = spends.iter().map(|&s| (s, curve.response(s))).collect();
        ChannelHistory::from_pairs(channel, &pairs)
    }

    #[test]
    fn test_fits_clean_hill_data() {
        let truth = HillCurve::new(1000.0, 200.0, 1.5).unwrap();
        let spends: Vec<f64> = (1..=25).map(|i| i as f64 * 20.0).collect();
        let history = synthetic("search", &truth, &spends);

        let fitted = SaturationCurveFitter::default().fit(&history).unwrap();

        assert_eq!(fitted.channel, "search");
        assert!(fitted.fit.r_squared > 0.98, "r² = {}", fitted.fit.r_squared);
        let predicted = fitted.curve.response(250.0);
        let expected = truth.response(250.0);
        assert!((predicted - expected).abs() / expected < 0.1);
    }

    #[test]
    fn test_fits_noisy_concave_data() {
        let truth = HillCurve::new(5000.0, 1500.0, 0.9).unwrap();
        let pairs: Vec<(f64, f64)> = (1..=30)
            .map(|i| {
                let spend = i as f64 * 100.0;
                // Deterministic ±3% wobble
                let noise = if i % 2 == 0 { 1.03 } else { 0.97 };
                (spend, truth.response(spend) * noise)
            })
            .collect();
        let history = ChannelHistory::from_pairs("social", &pairs);

        let fitted = SaturationCurveFitter::default().fit(&history).unwrap();
        assert!(fitted.fit.r_squared > 0.9, "r² = {}", fitted.fit.r_squared);
        assert!(fitted.fit.rmse > 0.0);
    }

    #[test]
    fn test_insufficient_data() {
        let history = ChannelHistory::from_pairs("tv", &[(1.0, 2.0), (2.0, 3.0)]);
        let err = SaturationCurveFitter::default().fit(&history).unwrap_err();
        assert!(matches!(
            err,
            MixError::Fit(FitError::InsufficientData { got: 2, required: 3, .. })
        ));
    }

    #[test]
    fn test_rejects_negative_and_nan() {
        let fitter = SaturationCurveFitter::default();
        let history = ChannelHistory::from_pairs("tv", &[(1.0, 2.0), (-2.0, 3.0), (3.0, 4.0)]);
        assert!(matches!(
            fitter.fit(&history).unwrap_err(),
            MixError::Fit(FitError::InvalidObservation { index: 1, .. })
        ));

        let history = ChannelHistory::from_pairs("tv", &[(1.0, 2.0), (2.0, f64::NAN), (3.0, 4.0)]);
        assert!(fitter.fit(&history).is_err());
    }

    #[test]
    fn test_rejects_all_zero_spend() {
        let history = ChannelHistory::from_pairs("tv", &[(0.0, 2.0), (0.0, 3.0), (0.0, 4.0)]);
        assert!(matches!(
            SaturationCurveFitter::default().fit(&history).unwrap_err(),
            MixError::Fit(FitError::ZeroSpend { .. })
        ));
    }

    #[test]
    fn test_fit_all_rejects_duplicates() {
        let truth = HillCurve::new(100.0, 10.0, 1.0).unwrap();
        let spends = [5.0, 10.0, 20.0, 40.0];
        let histories = vec![
            synthetic("search", &truth, &spends),
            synthetic("search", &truth, &spends),
        ];
        assert!(matches!(
            SaturationCurveFitter::default().fit_all(&histories).unwrap_err(),
            MixError::Fit(FitError::DuplicateChannel(_))
        ));
    }

    #[test]
    fn test_fit_all_preserves_order() {
        let truth = HillCurve::new(100.0, 10.0, 1.0).unwrap();
        let spends = [5.0, 10.0, 20.0, 40.0];
        let histories = vec![
            synthetic("search", &truth, &spends),
            synthetic("display", &truth, &spends),
        ];
        let fitted = SaturationCurveFitter::default().fit_all(&histories).unwrap();
        let names: Vec<_> = fitted.iter().map(|f| f.channel.as_str()).collect();
        assert_eq!(names, ["search", "display"]);
    }

    #[test]
    fn test_iteration_cap_reported() {
        let fitter = SaturationCurveFitter::new(FitterConfig {
            max_iterations: 1,
            tolerance: 0.0,
            ..Default::default()
        })
        .unwrap();
        let truth = HillCurve::new(1000.0, 200.0, 1.5).unwrap();
        let history = synthetic("search", &truth, &[50.0, 100.0, 200.0, 400.0]);
        let fitted = fitter.fit(&history).unwrap();
        assert_eq!(fitted.fit.iterations, 1);
        assert!(!fitted.fit.converged);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_fitted_curve_is_valid(
            alpha in 10.0f64..10_000.0,
            beta in 10.0f64..1_000.0,
            gamma in 0.5f64..3.0,
        ) {
            let truth = HillCurve::new(alpha, beta, gamma).unwrap();
            let spends: Vec<f64> = (1..=12).map(|i| i as f64 * beta / 4.0).collect();
            let history = synthetic("channel", &truth, &spends);

            let fitted = SaturationCurveFitter::default().fit(&history).unwrap();
            prop_assert!(fitted.curve.validate().is_ok());
            prop_assert!(fitted.fit.r_squared <= 1.0 + 1e-9);
            prop_assert!(fitted.fit.rmse.is_finite());
            prop_assert!(
                fitted.fit.converged
                    || fitted.fit.iterations == FitterConfig::default().max_iterations
            );
        }
    }
}

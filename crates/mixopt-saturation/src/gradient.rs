//! Loss and analytic gradient of the Hill transform
//!
//! With `u = (β/x)^γ` the curve is `f = α / (1 + u)` and
//!
//! ```text
//! ∂f/∂α = 1 / (1 + u)
//! ∂f/∂β = -α·γ·u / (β·(1 + u)²)
//! ∂f/∂γ = -α·u·ln(β/x) / (1 + u)²
//! ```

/// Curve parameters in the order `[alpha, beta, gamma]`
pub type Params = [f64; 3];

/// Value and partial derivatives of the curve at one point
#[inline]
pub fn value_and_partials(p: &Params, x: f64) -> (f64, Params) {
    let [alpha, beta, gamma] = *p;
    if x <= 0.0 {
        return (0.0, [0.0; 3]);
    }
    let u = (beta / x).powf(gamma);
    if !u.is_finite() {
        return (0.0, [0.0; 3]);
    }
    let h = 1.0 / (1.0 + u);
    let denom = (1.0 + u).powi(2);
    let d_alpha = h;
    let d_beta = -alpha * gamma * u / (beta * denom);
    let d_gamma = -alpha * u * (beta / x).ln() / denom;
    (alpha * h, [d_alpha, d_beta, d_gamma])
}

/// Mean squared error over normalized points
pub fn loss(p: &Params, xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len() as f64;
    xs.iter()
        .zip(ys)
        .map(|(&x, &y)| {
            let (f, _) = value_and_partials(p, x);
            (f - y).powi(2)
        })
        .sum::<f64>()
        / n
}

/// Gradient of [`loss`] with respect to the parameters
pub fn loss_gradient(p: &Params, xs: &[f64], ys: &[f64]) -> Params {
    let n = xs.len() as f64;
    let mut grad = [0.0; 3];
    for (&x, &y) in xs.iter().zip(ys) {
        let (f, partials) = value_and_partials(p, x);
        let residual = f - y;
        for (g, d) in grad.iter_mut().zip(partials) {
            *g += 2.0 * residual * d / n;
        }
    }
    grad
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partials_match_finite_difference() {
        let p = [1.3, 0.4, 1.7];
        let h = 1e-6;
        for x in [0.1, 0.4, 0.9] {
            let (_, analytic) = value_and_partials(&p, x);
            for i in 0..3 {
                let mut up = p;
                let mut down = p;
                up[i] += h;
                down[i] -= h;
                let numeric =
                    (value_and_partials(&up, x).0 - value_and_partials(&down, x).0) / (2.0 * h);
                assert!(
                    (numeric - analytic[i]).abs() < 1e-6,
                    "param {i} at x={x}: {numeric} vs {}",
                    analytic[i]
                );
            }
        }
    }

    #[test]
    fn test_loss_gradient_matches_finite_difference() {
        let p = [1.1, 0.5, 1.2];
        let xs = [0.1, 0.3, 0.6, 1.0];
        let ys = [0.2, 0.5, 0.8, 0.95];
        let analytic = loss_gradient(&p, &xs, &ys);
        let h = 1e-6;
        for i in 0..3 {
            let mut up = p;
            let mut down = p;
            up[i] += h;
            down[i] -= h;
            let numeric = (loss(&up, &xs, &ys) - loss(&down, &xs, &ys)) / (2.0 * h);
            assert!((numeric - analytic[i]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_zero_spend_contributes_nothing() {
        let (f, partials) = value_and_partials(&[1.0, 0.5, 1.0], 0.0);
        assert_eq!(f, 0.0);
        assert_eq!(partials, [0.0; 3]);
    }
}

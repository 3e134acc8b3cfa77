//! Shared numerical helpers for the IRT models.

use ndarray::ArrayView1;

/// Logistic-to-normal-ogive scaling constant used by the 2PL/3PL family.
pub const D_SCALE: f64 = 1.702;

/// Two-sided 95% normal quantile used for confidence bounds.
pub const Z_95: f64 = 1.96;

/// Sigmoid function with numerical stability.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let exp_x = x.exp();
        exp_x / (1.0 + exp_x)
    }
}

#[inline]
pub fn log_sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        -(-x).exp().ln_1p()
    } else {
        x - x.exp().ln_1p()
    }
}

#[inline]
pub fn logsumexp(arr: &[f64]) -> f64 {
    if arr.is_empty() {
        return f64::NEG_INFINITY;
    }
    let max_val = arr.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max_val.is_infinite() {
        return max_val;
    }
    let sum: f64 = arr.iter().map(|x| (x - max_val).exp()).sum();
    max_val + sum.ln()
}

/// Turn unnormalized log posterior values into weights that sum to one.
///
/// Returns `None` when every entry is `-inf` (or NaN), i.e. the posterior
/// carries no mass anywhere on the grid.
pub fn normalize_log_posterior(log_posterior: &[f64]) -> Option<Vec<f64>> {
    let log_norm = logsumexp(log_posterior);
    if !log_norm.is_finite() {
        return None;
    }
    Some(
        log_posterior
            .iter()
            .map(|&lp| (lp - log_norm).exp())
            .collect(),
    )
}

/// Posterior mean and standard deviation of a discrete distribution.
pub fn compute_eap_with_se(posterior: ArrayView1<f64>, nodes: ArrayView1<f64>) -> (f64, f64) {
    let eap = posterior.dot(&nodes);
    let variance = nodes.mapv(|t| (t - eap).powi(2)).dot(&posterior);
    (eap, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn sigmoid_is_symmetric() {
        for x in [-30.0, -2.5, 0.0, 1.0, 40.0] {
            assert!((sigmoid(x) + sigmoid(-x) - 1.0).abs() < 1e-12);
        }
        assert_eq!(sigmoid(0.0), 0.5);
    }

    #[test]
    fn log_sigmoid_matches_ln_of_sigmoid() {
        for x in [-8.0, -1.0, 0.0, 0.5, 6.0] {
            assert!((log_sigmoid(x) - sigmoid(x).ln()).abs() < 1e-12);
        }
    }

    #[test]
    fn logsumexp_handles_large_magnitudes() {
        let v = [-1000.0, -1000.0];
        assert!((logsumexp(&v) - (-1000.0 + 2f64.ln())).abs() < 1e-9);
        assert_eq!(logsumexp(&[]), f64::NEG_INFINITY);
    }

    #[test]
    fn normalize_rejects_empty_mass() {
        assert!(normalize_log_posterior(&[f64::NEG_INFINITY; 3]).is_none());
        let w = normalize_log_posterior(&[0.0, 0.0, 0.0, 0.0]).unwrap();
        assert!(w.iter().all(|&x| (x - 0.25).abs() < 1e-12));
    }

    #[test]
    fn eap_of_symmetric_distribution() {
        let (mean, sd) = compute_eap_with_se(array![0.5, 0.5].view(), array![-1.0, 1.0].view());
        assert!(mean.abs() < 1e-12);
        assert!((sd - 1.0).abs() < 1e-12);
    }
}

//! Three-parameter logistic model with EAP scoring over a fixed quadrature grid.
//!
//! With the guessing parameter absent (or zero) the same functions give the
//! two-parameter logistic model.

use ndarray::Array1;
use tracing::{debug, trace};

use crate::bank::ItemLookup;
use crate::types::{ItemParameters, ResponseData, ThetaEstimate};
use crate::utils::{D_SCALE, compute_eap_with_se, log_sigmoid, normalize_log_posterior, sigmoid};

pub const DEFAULT_QUADRATURE_POINTS: usize = 41;
pub const QUADRATURE_MIN: f64 = -4.0;
pub const QUADRATURE_MAX: f64 = 4.0;

/// Equally spaced abscissas over a closed interval.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadratureGrid {
    nodes: Array1<f64>,
}

impl QuadratureGrid {
    /// `points` abscissas from `min` to `max` inclusive.
    pub fn uniform(points: usize, min: f64, max: f64) -> Self {
        Self {
            nodes: Array1::linspace(min, max, points),
        }
    }

    /// The grid used by EAP scoring: `points` abscissas over [-4, 4].
    pub fn standard(points: usize) -> Self {
        Self::uniform(points, QUADRATURE_MIN, QUADRATURE_MAX)
    }

    pub fn nodes(&self) -> &Array1<f64> {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Stateless 3PL model.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreePlModel;

impl ThreePlModel {
    /// Logistic part of the response function, `1 / (1 + exp(-D a (theta - b)))`.
    #[inline]
    fn logistic(&self, theta: f64, item: &ItemParameters) -> f64 {
        sigmoid(D_SCALE * item.discrimination * (theta - item.difficulty))
    }

    /// P(X=1|theta,a,b,c) = c + (1-c) * L
    #[inline]
    pub fn probability(&self, theta: f64, item: &ItemParameters) -> f64 {
        let c = item.guessing_or_zero();
        c + (1.0 - c) * self.logistic(theta, item)
    }

    /// Fisher information, `D^2 a^2 (1-c)^2 L^2 (1-L)^2 / (P (1-P))`.
    ///
    /// Zero when `P (1-P)` vanishes.
    pub fn information(&self, theta: f64, item: &ItemParameters) -> f64 {
        let a = item.discrimination;
        let c = item.guessing_or_zero();
        let l = self.logistic(theta, item);
        let p = c + (1.0 - c) * l;

        let numerator = D_SCALE * D_SCALE * a * a * (1.0 - c).powi(2) * (l * (1.0 - l)).powi(2);
        let denominator = p * (1.0 - p);

        if denominator > 0.0 {
            numerator / denominator
        } else {
            0.0
        }
    }

    /// Log-likelihood of the matched responses at `theta`.
    ///
    /// `ln(1-P)` is taken as `ln(1-c) + ln(1-L)`, and `ln P` as `ln L` when
    /// there is no guessing, so saturated items stay finite.
    pub fn log_likelihood<L: ItemLookup + ?Sized>(
        &self,
        responses: &[ResponseData],
        items: &L,
        theta: f64,
    ) -> f64 {
        let mut ll = 0.0;
        for response in responses {
            let Some(item) = items.item(&response.item_id) else {
                trace!(item_id = %response.item_id, "skipping response to unknown item");
                continue;
            };
            let c = item.guessing_or_zero();
            let z = D_SCALE * item.discrimination * (theta - item.difficulty);
            ll += match (response.correct, c > 0.0) {
                (true, true) => self.probability(theta, item).ln(),
                (true, false) => log_sigmoid(z),
                (false, _) => (-c).ln_1p() + log_sigmoid(-z),
            };
        }
        ll
    }

    /// Expected a posteriori theta under a normal prior, on `quadrature_points`
    /// equally spaced nodes over [-4, 4].
    pub fn estimate_theta<L: ItemLookup + ?Sized>(
        &self,
        responses: &[ResponseData],
        items: &L,
        prior_mean: f64,
        prior_variance: f64,
        quadrature_points: usize,
    ) -> ThetaEstimate {
        let grid = QuadratureGrid::standard(quadrature_points);
        self.estimate_theta_on_grid(responses, items, prior_mean, prior_variance, &grid)
    }

    pub fn estimate_theta_on_grid<L: ItemLookup + ?Sized>(
        &self,
        responses: &[ResponseData],
        items: &L,
        prior_mean: f64,
        prior_variance: f64,
        grid: &QuadratureGrid,
    ) -> ThetaEstimate {
        let nodes = grid.nodes();
        let log_prior: Vec<f64> = nodes
            .iter()
            .map(|&t| -0.5 * (t - prior_mean).powi(2) / prior_variance)
            .collect();

        let log_posterior: Vec<f64> = nodes
            .iter()
            .zip(&log_prior)
            .map(|(&t, &lp)| self.log_likelihood(responses, items, t) + lp)
            .collect();

        let posterior = normalize_log_posterior(&log_posterior).or_else(|| {
            debug!("posterior has no mass on the grid, falling back to the prior");
            normalize_log_posterior(&log_prior)
        });

        let Some(posterior) = posterior.map(Array1::from) else {
            return ThetaEstimate::with_normal_interval(prior_mean, prior_variance.sqrt());
        };

        let (theta, standard_error) = compute_eap_with_se(posterior.view(), nodes.view());
        ThetaEstimate::with_normal_interval(theta, standard_error)
    }
}

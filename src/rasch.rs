//! Rasch (one-parameter logistic) model with Newton-Raphson MLE scoring.

use tracing::{debug, trace};

use crate::bank::ItemLookup;
use crate::types::{ItemParameters, ResponseData, ThetaEstimate};
use crate::utils::sigmoid;

pub const DEFAULT_MAX_ITERATIONS: usize = 100;
pub const DEFAULT_TOLERANCE: f64 = 0.001;

/// Standard error reported when the responses carry no information.
const FALLBACK_SE: f64 = 1.0;

/// Stateless Rasch model. Discrimination and guessing are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct RaschModel;

impl RaschModel {
    /// P(X=1|theta,b) = exp(theta-b) / (1 + exp(theta-b))
    #[inline]
    pub fn probability(&self, theta: f64, item: &ItemParameters) -> f64 {
        sigmoid(theta - item.difficulty)
    }

    /// I(theta) = P(theta) * Q(theta)
    #[inline]
    pub fn information(&self, theta: f64, item: &ItemParameters) -> f64 {
        let p = self.probability(theta, item);
        p * (1.0 - p)
    }

    /// Maximum-likelihood theta by Newton-Raphson, starting at `prior_mean`.
    ///
    /// Responses whose item id is missing from `items` are skipped. Iteration
    /// stops when the step falls below `tolerance`, when the matched items carry
    /// no information, or after `max_iterations` steps.
    pub fn estimate_theta<L: ItemLookup + ?Sized>(
        &self,
        responses: &[ResponseData],
        items: &L,
        prior_mean: f64,
        max_iterations: usize,
        tolerance: f64,
    ) -> ThetaEstimate {
        let mut theta = prior_mean;
        let mut stopped = false;

        for iteration in 0..max_iterations {
            let mut numerator = 0.0;
            let mut denominator = 0.0;

            for response in responses {
                let Some(item) = items.item(&response.item_id) else {
                    trace!(item_id = %response.item_id, "skipping response to unknown item");
                    continue;
                };
                let p = self.probability(theta, item);
                numerator += response.score() - p;
                denominator += p * (1.0 - p);
            }

            if denominator == 0.0 {
                debug!(iteration, theta, "no information available, stopping MLE");
                stopped = true;
                break;
            }

            let delta = numerator / denominator;
            theta += delta;

            if delta.abs() < tolerance {
                stopped = true;
                break;
            }
        }

        if !stopped {
            debug!(max_iterations, theta, "Rasch MLE did not converge");
        }

        let total_info: f64 = responses
            .iter()
            .filter_map(|r| items.item(&r.item_id))
            .map(|item| self.information(theta, item))
            .sum();

        let standard_error = if total_info > 0.0 {
            1.0 / total_info.sqrt()
        } else {
            FALLBACK_SE
        };

        ThetaEstimate::with_normal_interval(theta, standard_error)
    }
}

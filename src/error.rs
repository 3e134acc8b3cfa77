//! Configuration errors.
//!
//! Estimation itself never fails; every problem that can make an estimator
//! unusable is caught when it is constructed.

use thiserror::Error;

use crate::estimator::ScoringModel;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The model is a valid scoring model but has no IRT estimator (CTT).
    #[error("scoring model {0} has no theta estimator")]
    UnsupportedModel(ScoringModel),

    #[error("unknown scoring model: {0}. Valid models: RASCH, 1PL, 2PL, 3PL, CTT")]
    UnknownModel(String),

    #[error("prior variance must be positive and finite, got {0}")]
    InvalidPriorVariance(f64),

    #[error("prior mean must be finite, got {0}")]
    InvalidPriorMean(f64),

    #[error("quadrature needs at least 2 points, got {0}")]
    InvalidQuadraturePoints(usize),

    #[error("invalid convergence criteria: max_iterations={max_iterations}, tolerance={tolerance}")]
    InvalidConvergence { max_iterations: usize, tolerance: f64 },

    #[error("failed to parse estimator config: {0}")]
    Parse(#[from] toml::de::Error),
}

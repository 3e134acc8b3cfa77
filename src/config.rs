//! Estimator configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::estimator::ScoringModel;
use crate::rasch::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
use crate::three_pl::DEFAULT_QUADRATURE_POINTS;

/// Settings fixed when a [`ThetaEstimator`](crate::ThetaEstimator) is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct EstimatorConfig {
    pub model: ScoringModel,
    pub prior_mean: f64,
    pub prior_variance: f64,
    /// Newton-Raphson iteration cap (Rasch family).
    pub max_iterations: usize,
    /// Newton-Raphson step size at which iteration stops (Rasch family).
    pub tolerance: f64,
    /// EAP grid size (2PL/3PL family).
    pub quadrature_points: usize,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            model: ScoringModel::ThreePl,
            prior_mean: 0.0,
            prior_variance: 1.0,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            quadrature_points: DEFAULT_QUADRATURE_POINTS,
        }
    }
}

impl EstimatorConfig {
    /// Default settings with `model` in place of 3PL.
    pub fn for_model(model: ScoringModel) -> Self {
        Self {
            model,
            ..Self::default()
        }
    }

    pub fn with_prior(mut self, mean: f64, variance: f64) -> Self {
        self.prior_mean = mean;
        self.prior_variance = variance;
        self
    }

    pub fn with_convergence(mut self, max_iterations: usize, tolerance: f64) -> Self {
        self.max_iterations = max_iterations;
        self.tolerance = tolerance;
        self
    }

    pub fn with_quadrature_points(mut self, points: usize) -> Self {
        self.quadrature_points = points;
        self
    }

    /// Parse a TOML document. Missing keys take their defaults; unknown keys
    /// (including snake_case spellings) are rejected.
    ///
    /// ```
    /// use irt_cat::{EstimatorConfig, ScoringModel};
    ///
    /// let config = EstimatorConfig::from_toml_str(r#"
    ///     model = "RASCH"
    ///     priorMean = 0.5
    /// "#).unwrap();
    /// assert_eq!(config.model, ScoringModel::Rasch);
    /// assert_eq!(config.prior_variance, 1.0);
    /// ```
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: EstimatorConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.family().is_none() {
            return Err(ConfigError::UnsupportedModel(self.model));
        }
        if !self.prior_mean.is_finite() {
            return Err(ConfigError::InvalidPriorMean(self.prior_mean));
        }
        if !(self.prior_variance.is_finite() && self.prior_variance > 0.0) {
            return Err(ConfigError::InvalidPriorVariance(self.prior_variance));
        }
        if self.quadrature_points < 2 {
            return Err(ConfigError::InvalidQuadraturePoints(self.quadrature_points));
        }
        if self.max_iterations == 0 || self.tolerance.is_nan() || self.tolerance <= 0.0 {
            return Err(ConfigError::InvalidConvergence {
                max_iterations: self.max_iterations,
                tolerance: self.tolerance,
            });
        }
        Ok(())
    }
}

//! Model-family dispatch for theta estimation and maximum-information item
//! selection.

use std::fmt;
use std::str::FromStr;

use ndarray::Array1;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::bank::{ItemBank, ItemLookup};
use crate::config::EstimatorConfig;
use crate::error::ConfigError;
use crate::rasch::RaschModel;
use crate::three_pl::ThreePlModel;
use crate::types::{ConfidenceInterval, ItemParameters, ResponseData, SelectedItem, ThetaEstimate};
use crate::utils::Z_95;

/// Scoring model identifiers accepted across the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoringModel {
    #[serde(rename = "RASCH")]
    Rasch,
    #[serde(rename = "1PL")]
    OnePl,
    #[serde(rename = "2PL")]
    TwoPl,
    #[default]
    #[serde(rename = "3PL")]
    ThreePl,
    /// Classical test theory. Valid as a scoring model, not estimable here.
    #[serde(rename = "CTT")]
    Ctt,
}

impl ScoringModel {
    pub const ALL: [ScoringModel; 5] = [
        ScoringModel::Rasch,
        ScoringModel::OnePl,
        ScoringModel::TwoPl,
        ScoringModel::ThreePl,
        ScoringModel::Ctt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringModel::Rasch => "RASCH",
            ScoringModel::OnePl => "1PL",
            ScoringModel::TwoPl => "2PL",
            ScoringModel::ThreePl => "3PL",
            ScoringModel::Ctt => "CTT",
        }
    }

    /// The estimation family, or `None` for models without an IRT estimator.
    pub fn family(&self) -> Option<ModelFamily> {
        match self {
            ScoringModel::Rasch | ScoringModel::OnePl => Some(ModelFamily::Rasch),
            ScoringModel::TwoPl | ScoringModel::ThreePl => Some(ModelFamily::Logistic),
            ScoringModel::Ctt => None,
        }
    }

    /// Whether discrimination is a free parameter of the model.
    pub fn has_discrimination(&self) -> bool {
        !matches!(self, ScoringModel::Rasch | ScoringModel::OnePl)
    }
}

impl fmt::Display for ScoringModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoringModel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScoringModel::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownModel(s.to_string()))
    }
}

/// Behavioral arm an estimable model routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelFamily {
    /// Rasch/1PL: logistic in `theta - b`, scored by MLE.
    Rasch,
    /// 2PL/3PL: scaled logistic with optional guessing, scored by EAP.
    Logistic,
}

/// Theta estimator bound to one model family and prior.
///
/// Holds no mutable state; all methods can be called concurrently.
#[derive(Debug, Clone)]
pub struct ThetaEstimator {
    rasch: RaschModel,
    three_pl: ThreePlModel,
    family: ModelFamily,
    config: EstimatorConfig,
}

impl ThetaEstimator {
    pub fn new(config: EstimatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let family = config
            .model
            .family()
            .ok_or(ConfigError::UnsupportedModel(config.model))?;
        Ok(Self {
            rasch: RaschModel,
            three_pl: ThreePlModel,
            family,
            config,
        })
    }

    /// Estimator with default settings for `model`.
    pub fn for_model(model: ScoringModel) -> Result<Self, ConfigError> {
        Self::new(EstimatorConfig::for_model(model))
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    pub fn family(&self) -> ModelFamily {
        self.family
    }

    /// Estimate before any response: the prior mean and standard deviation.
    ///
    /// The interval is the fixed `[-1.96, 1.96]` regardless of the configured
    /// prior.
    pub fn prior_estimate(&self) -> ThetaEstimate {
        ThetaEstimate {
            theta: self.config.prior_mean,
            standard_error: self.config.prior_variance.sqrt(),
            confidence: ConfidenceInterval {
                lower: -Z_95,
                upper: Z_95,
            },
        }
    }

    /// Estimate the ability behind `responses`, or [`prior_estimate`] when
    /// there are none.
    ///
    /// [`prior_estimate`]: ThetaEstimator::prior_estimate
    pub fn estimate<L: ItemLookup + ?Sized>(
        &self,
        responses: &[ResponseData],
        items: &L,
    ) -> ThetaEstimate {
        if responses.is_empty() {
            return self.prior_estimate();
        }

        let config = &self.config;

        match self.family {
            ModelFamily::Rasch => self.rasch.estimate_theta(
                responses,
                items,
                config.prior_mean,
                config.max_iterations,
                config.tolerance,
            ),
            ModelFamily::Logistic => self.three_pl.estimate_theta(
                responses,
                items,
                config.prior_mean,
                config.prior_variance,
                config.quadrature_points,
            ),
        }
    }

    /// Score many examinees against the same items in parallel.
    ///
    /// Output order matches `sessions`.
    pub fn estimate_batch<L: ItemLookup + Sync + ?Sized>(
        &self,
        sessions: &[Vec<ResponseData>],
        items: &L,
    ) -> Vec<ThetaEstimate> {
        sessions
            .par_iter()
            .map(|responses| self.estimate(responses, items))
            .collect()
    }

    #[inline]
    pub fn probability(&self, theta: f64, item: &ItemParameters) -> f64 {
        match self.family {
            ModelFamily::Rasch => self.rasch.probability(theta, item),
            ModelFamily::Logistic => self.three_pl.probability(theta, item),
        }
    }

    #[inline]
    pub fn information(&self, theta: f64, item: &ItemParameters) -> f64 {
        match self.family {
            ModelFamily::Rasch => self.rasch.information(theta, item),
            ModelFamily::Logistic => self.three_pl.information(theta, item),
        }
    }

    /// Pick the candidate with maximum information at `current_theta`.
    ///
    /// Candidates are visited in iteration order and ids in `exclude_ids` are
    /// skipped. On ties the first candidate wins. Returns `None` when nothing
    /// is left to choose from.
    pub fn select_next_item<'a, I, K, E>(
        &self,
        current_theta: f64,
        available_items: I,
        exclude_ids: &[E],
    ) -> Option<SelectedItem>
    where
        I: IntoIterator<Item = (K, &'a ItemParameters)>,
        K: AsRef<str>,
        E: AsRef<str>,
    {
        let mut best: Option<(K, f64)> = None;
        let mut max_info = f64::NEG_INFINITY;

        for (item_id, params) in available_items {
            if exclude_ids.iter().any(|e| e.as_ref() == item_id.as_ref()) {
                continue;
            }
            let info = self.information(current_theta, params);
            if info > max_info {
                max_info = info;
                best = Some((item_id, info));
            }
        }

        best.map(|(item_id, information)| SelectedItem {
            item_id: item_id.as_ref().to_string(),
            information,
        })
    }

    /// Information of every bank item at `theta`, in bank order.
    pub fn information_profile(&self, theta: f64, bank: &ItemBank) -> Array1<f64> {
        bank.iter()
            .map(|(_, item)| self.information(theta, item))
            .collect()
    }

    /// Test information: the sum of item information over the bank.
    pub fn test_information(&self, theta: f64, bank: &ItemBank) -> f64 {
        self.information_profile(theta, bank).sum()
    }
}

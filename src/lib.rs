//! Item Response Theory ability estimation and adaptive item selection.
//!
//! This crate provides:
//! - Response and information functions for the Rasch (1PL) and 2PL/3PL models
//! - Theta estimation by Newton-Raphson MLE (Rasch) and EAP quadrature (2PL/3PL)
//! - Maximum Fisher information item selection
//! - Range validation for scoring models, item parameters and theta values
//! - An adaptive session driver and parallel CAT simulation
//!
//! ```
//! use irt_cat::{ItemBank, ItemParameters, ResponseData, ScoringModel, ThetaEstimator};
//!
//! let estimator = ThetaEstimator::for_model(ScoringModel::ThreePl).unwrap();
//! let bank: ItemBank = [
//!     ("q1", ItemParameters::new(1.0, 0.0).with_guessing(0.2)),
//!     ("q2", ItemParameters::new(1.3, 0.8)),
//! ]
//! .into_iter()
//! .collect();
//!
//! let estimate = estimator.estimate(&[ResponseData::correct("q1")], &bank);
//! assert!(estimate.theta > 0.0);
//!
//! let next = estimator.select_next_item(estimate.theta, &bank, &["q1"]).unwrap();
//! assert_eq!(next.item_id, "q2");
//! ```

pub mod utils;

pub mod bank;
pub mod cat;
pub mod config;
pub mod error;
pub mod estimator;
pub mod rasch;
pub mod three_pl;
pub mod types;
pub mod validators;

pub use bank::{ItemBank, ItemLookup};
pub use cat::{AdaptiveSession, StopReason, StoppingRule};
pub use config::EstimatorConfig;
pub use error::ConfigError;
pub use estimator::{ModelFamily, ScoringModel, ThetaEstimator};
pub use rasch::RaschModel;
pub use three_pl::{QuadratureGrid, ThreePlModel};
pub use types::{ConfidenceInterval, ItemParameters, ResponseData, SelectedItem, ThetaEstimate};
pub use validators::{
    ValidationResult, validate_item_bank, validate_item_parameters, validate_scoring_model,
    validate_theta_range,
};

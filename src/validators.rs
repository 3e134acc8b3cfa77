//! Range checks for scoring models, item parameters and theta values.
//!
//! Findings accumulate instead of failing fast; callers decide which ones
//! are fatal.

use serde::{Deserialize, Serialize};

use crate::bank::ItemBank;
use crate::estimator::ScoringModel;
use crate::types::ItemParameters;

pub const DIFFICULTY_RANGE: (f64, f64) = (-5.0, 5.0);
pub const MAX_DISCRIMINATION: f64 = 5.0;
pub const GUESSING_RANGE: (f64, f64) = (0.0, 0.5);
pub const THETA_RANGE: (f64, f64) = (-6.0, 6.0);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

fn within(value: f64, (min, max): (f64, f64)) -> bool {
    (min..=max).contains(&value)
}

pub fn validate_scoring_model(model: &str) -> ValidationResult {
    let mut errors = Vec::new();
    if model.parse::<ScoringModel>().is_err() {
        let valid: Vec<&str> = ScoringModel::ALL.iter().map(ScoringModel::as_str).collect();
        errors.push(format!(
            "Invalid scoring model: {model}. Valid models: {}",
            valid.join(", ")
        ));
    }
    ValidationResult::from_errors(errors)
}

/// Check item parameters against the ranges that apply under `model`.
///
/// Difficulty is always checked. Discrimination is checked for every model
/// except Rasch/1PL, and guessing (absent counts as 0) only for 3PL.
pub fn validate_item_parameters(params: &ItemParameters, model: ScoringModel) -> ValidationResult {
    let mut errors = Vec::new();

    if !within(params.difficulty, DIFFICULTY_RANGE) {
        errors.push(format!(
            "Difficulty parameter out of range [-5, 5]: {}",
            params.difficulty
        ));
    }

    if model.has_discrimination() {
        let a = params.discrimination;
        if !(a > 0.0 && a <= MAX_DISCRIMINATION) {
            errors.push(format!("Discrimination parameter out of range (0, 5]: {a}"));
        }
    }

    if model == ScoringModel::ThreePl {
        let guessing = params.guessing_or_zero();
        if !within(guessing, GUESSING_RANGE) {
            errors.push(format!("Guessing parameter out of range [0, 0.5]: {guessing}"));
        }
    }

    ValidationResult::from_errors(errors)
}

pub fn validate_theta_range(theta: f64) -> ValidationResult {
    let mut errors = Vec::new();
    if !within(theta, THETA_RANGE) {
        errors.push(format!("Theta estimate out of practical range [-6, 6]: {theta}"));
    }
    ValidationResult::from_errors(errors)
}

/// Validate every item of a bank; each finding is prefixed with its item id.
pub fn validate_item_bank(bank: &ItemBank, model: ScoringModel) -> ValidationResult {
    let errors = bank
        .iter()
        .flat_map(|(id, params)| {
            validate_item_parameters(params, model)
                .errors
                .into_iter()
                .map(move |e| format!("{id}: {e}"))
        })
        .collect();
    ValidationResult::from_errors(errors)
}

//! Psychometric value types shared by the models and the estimator.

use serde::{Deserialize, Serialize};

use crate::utils::Z_95;

/// Calibrated parameters of a dichotomous item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemParameters {
    /// Item discrimination (a-parameter).
    pub discrimination: f64,
    /// Item difficulty (b-parameter).
    pub difficulty: f64,
    /// Guessing parameter (c-parameter). Absent means 0, which reduces 3PL to 2PL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guessing: Option<f64>,
}

impl ItemParameters {
    pub fn new(discrimination: f64, difficulty: f64) -> Self {
        Self {
            discrimination,
            difficulty,
            guessing: None,
        }
    }

    pub fn with_guessing(mut self, guessing: f64) -> Self {
        self.guessing = Some(guessing);
        self
    }

    /// Rasch item: unit discrimination, no guessing.
    pub fn rasch(difficulty: f64) -> Self {
        Self::new(1.0, difficulty)
    }

    #[inline]
    pub fn guessing_or_zero(&self) -> f64 {
        self.guessing.unwrap_or(0.0)
    }
}

/// One observed answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    pub item_id: String,
    #[serde(rename = "response", with = "binary_response")]
    pub correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<f64>,
}

impl ResponseData {
    pub fn new(item_id: impl Into<String>, correct: bool) -> Self {
        Self {
            item_id: item_id.into(),
            correct,
            response_time_ms: None,
        }
    }

    pub fn correct(item_id: impl Into<String>) -> Self {
        Self::new(item_id, true)
    }

    pub fn incorrect(item_id: impl Into<String>) -> Self {
        Self::new(item_id, false)
    }

    pub fn with_response_time(mut self, ms: f64) -> Self {
        self.response_time_ms = Some(ms);
        self
    }

    /// Scored response as 0.0 or 1.0.
    #[inline]
    pub fn score(&self) -> f64 {
        if self.correct { 1.0 } else { 0.0 }
    }
}

/// Responses travel as the integers 0 and 1.
mod binary_response {
    use serde::de::{self, Deserializer};
    use serde::{Deserialize, Serializer};

    pub fn serialize<S: Serializer>(correct: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*correct))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(de::Error::invalid_value(
                de::Unexpected::Unsigned(u64::from(other)),
                &"0 or 1",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    pub fn contains(&self, value: f64) -> bool {
        (self.lower..=self.upper).contains(&value)
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Ability estimate with its standard error and 95% interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThetaEstimate {
    pub theta: f64,
    pub standard_error: f64,
    pub confidence: ConfidenceInterval,
}

impl ThetaEstimate {
    /// Estimate with a normal-approximation 95% interval around `theta`.
    pub fn with_normal_interval(theta: f64, standard_error: f64) -> Self {
        Self {
            theta,
            standard_error,
            confidence: ConfidenceInterval {
                lower: theta - Z_95 * standard_error,
                upper: theta + Z_95 * standard_error,
            },
        }
    }
}

/// Outcome of maximum-information item selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedItem {
    pub item_id: String,
    pub information: f64,
}

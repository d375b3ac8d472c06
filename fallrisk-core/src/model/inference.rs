//! Inference Engine - classifier seam
//!
//! Every backend turns an arranged feature row into the probability of the
//! positive ("faller") class. Backends hold no per-call state, so the same
//! row always gives the same probability.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::threshold::RiskLabel;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("classifier returned invalid probability: {0}")]
    InvalidProbability(f64),

    #[error("inference failed: {0}")]
    Backend(String),
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Trait for binary classifiers (CatBoost JSON, ONNX, ...)
pub trait Classifier: Send + Sync {
    /// Short backend name, e.g. "catboost"
    fn kind(&self) -> &'static str;

    /// Number of input columns the model was trained with
    fn feature_count(&self) -> usize;

    /// Probability of the positive class for one row
    fn predict_proba(&self, features: &[f64]) -> Result<f64, InferenceError>;
}

/// Reject rows of the wrong width before touching a backend
pub(crate) fn check_width(expected: usize, features: &[f64]) -> Result<(), InferenceError> {
    if features.len() != expected {
        return Err(InferenceError::FeatureCount {
            expected,
            actual: features.len(),
        });
    }
    Ok(())
}

/// Reject anything a probability can't be
pub(crate) fn check_probability(p: f64) -> Result<f64, InferenceError> {
    if p.is_finite() && (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(InferenceError::InvalidProbability(p))
    }
}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Prediction output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Probability of Faller, 0.0 - 1.0
    pub probability: f64,
    /// 1 = Faller, 0 = Non-faller
    pub label: RiskLabel,
    pub threshold: f64,
    /// Backend that produced the probability
    pub method: String,
}

impl PredictionResult {
    pub fn is_high_risk(&self) -> bool {
        self.label.is_faller()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_probability() {
        assert_eq!(check_probability(0.0), Ok(0.0));
        assert_eq!(check_probability(1.0), Ok(1.0));
        assert!(check_probability(1.01).is_err());
        assert!(check_probability(-0.1).is_err());
        assert!(check_probability(f64::NAN).is_err());
    }

    #[test]
    fn test_check_width() {
        assert!(check_width(3, &[1.0, 2.0, 3.0]).is_ok());
        assert_eq!(
            check_width(3, &[1.0]),
            Err(InferenceError::FeatureCount { expected: 3, actual: 1 })
        );
    }
}

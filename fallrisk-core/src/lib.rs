//! Fall Risk Predictor - Core
//!
//! Turns one participant's form entries into a fall-risk prediction:
//!
//! ```text
//! FeatureRecord ──validate──▶ arrange (model column order) ──▶ Classifier
//!                                                                   │
//!                     PredictionResult ◀── threshold 0.50 ◀─────────┘
//! ```
//!
//! The [`ModelBundle`] is loaded once at startup and shared read-only.

pub mod constants;
pub mod features;
pub mod model;
pub mod predictor;

pub use features::{FeatureLayout, FeatureName, FeatureRecord, FeatureVector, LayoutInfo};
pub use model::{
    Classifier, InferenceError, ModelBundle, ModelLoadError, ModelMetadata, PredictionResult,
    RiskLabel, FALLER_THRESHOLD,
};
pub use predictor::{validate, validate_and_predict, PredictError};

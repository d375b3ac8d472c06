//! Model Module - classifier loading and inference
//!
//! Tách logic inference khỏi form handling.
//! - `bundle` - model file + declared feature order, loaded once
//! - `catboost` - pure Rust CatBoost JSON evaluator (default backend)
//! - `onnx` - ONNX Runtime backend, behind the `onnx` feature
//! - `threshold` - fixed faller threshold and labels

pub mod bundle;
pub mod catboost;
pub mod inference;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod threshold;


// Re-export common types
pub use bundle::{ModelBundle, ModelLoadError, ModelMetadata};
pub use catboost::{CatBoostClassifier, CatBoostError};
pub use inference::{Classifier, InferenceError, PredictionResult};
pub use threshold::{RiskLabel, FALLER_THRESHOLD};

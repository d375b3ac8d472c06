//! ONNX Runtime backend (feature `onnx`)
//!
//! For classifiers exported to ONNX with a single `[1, n]` float input.
//! CatBoost and skl2onnx exports emit `label` and `probabilities`; the
//! latter is used, or the last output when no output has that name.

use std::path::Path;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use super::inference::{check_probability, check_width, Classifier, InferenceError};

const PROBABILITIES_OUTPUT: &str = "probabilities";

pub struct OnnxClassifier {
    /// `Session::run` needs `&mut`
    session: Mutex<Session>,
    output_name: String,
    feature_count: usize,
}

impl OnnxClassifier {
    /// Load ONNX model from file
    pub fn load(model_path: &Path, feature_count: usize) -> Result<Self, String> {
        log::info!("Loading ONNX model from: {}", model_path.display());

        if !model_path.exists() {
            return Err(format!("Model not found: {}", model_path.display()));
        }

        let session = Session::builder()
            .map_err(|e| format!("Failed to create session builder: {}", e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| format!("Failed to set optimization: {}", e))?
            .commit_from_file(model_path)
            .map_err(|e| format!("Failed to load model: {}", e))?;

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name == PROBABILITIES_OUTPUT)
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .ok_or_else(|| "No output defined".to_string())?;

        log::info!("ONNX model loaded, reading output '{}'", output_name);

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            feature_count,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn feature_count(&self) -> usize {
        self.feature_count
    }

    fn predict_proba(&self, features: &[f64]) -> Result<f64, InferenceError> {
        check_width(self.feature_count, features)?;

        let row: Vec<f32> = features.iter().map(|&v| v as f32).collect();
        let input_array = Array2::<f32>::from_shape_vec((1, self.feature_count), row)
            .map_err(|e| InferenceError::Backend(format!("Array error: {}", e)))?;
        let input_tensor = Value::from_array(input_array)
            .map_err(|e| InferenceError::Backend(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError::Backend(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| InferenceError::Backend("No output".to_string()))?;
        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::Backend(format!("Extract error: {}", e)))?;

        // [1, 2] -> column 1 is the positive class
        let p = data
            .get(1)
            .copied()
            .ok_or_else(|| InferenceError::Backend("probabilities output has one column".to_string()))?;

        check_probability(f64::from(p))
    }
}

//! Model Bundle - trained classifier plus the column order it expects
//!
//! On disk a bundle is one JSON document:
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "name": "catboost_fall_model",
//!   "features": ["Gender", "Height", "..."],
//!   "model": { "type": "catboost", "oblivious_trees": [ ... ], "...": "..." }
//! }
//! ```
//!
//! `"model": {"type": "onnx", "path": "fall_model.onnx"}` points at an ONNX
//! file instead, resolved relative to the bundle. Any problem here is fatal:
//! the server does not start without a usable model.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::catboost::{CatBoostClassifier, CatBoostError, CatBoostModel};
use super::inference::Classifier;
use crate::constants::BUNDLE_FORMAT_VERSION;
use crate::features::{FeatureLayout, FeatureVector, LayoutError};
use crate::predictor::PredictError;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("model bundle not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read model bundle {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse model bundle {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unsupported bundle format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("invalid feature list: {0}")]
    Layout(#[from] LayoutError),

    #[error("invalid CatBoost model: {0}")]
    CatBoost(#[from] CatBoostError),

    #[error("bundle declares {declared} features but the model expects {model}")]
    FeatureCountMismatch { declared: usize, model: usize },

    #[error("failed to load ONNX model: {0}")]
    Onnx(String),

    #[error("bundle references ONNX model {} but ONNX support is not compiled in", .path.display())]
    OnnxDisabled { path: PathBuf },
}

// ============================================================================
// FILE FORMAT
// ============================================================================

#[derive(Debug, Deserialize)]
struct BundleFile {
    format_version: u32,
    #[serde(default)]
    name: Option<String>,
    features: Vec<String>,
    model: ModelSpec,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ModelSpec {
    Catboost(CatBoostModel),
    Onnx { path: PathBuf },
}

// ============================================================================
// METADATA
// ============================================================================

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub name: String,
    /// File the bundle was read from, or `<memory>`
    pub source: String,
    /// "catboost" or "onnx"
    pub kind: String,
    pub feature_count: usize,
    pub layout_hash: u32,
    pub loaded_at: DateTime<Utc>,
}

// ============================================================================
// MODEL BUNDLE
// ============================================================================

pub struct ModelBundle {
    layout: FeatureLayout,
    classifier: Box<dyn Classifier>,
    metadata: ModelMetadata,
}

impl fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBundle")
            .field("layout", &self.layout)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl ModelBundle {
    /// Load a bundle file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelLoadError> {
        let path = path.as_ref();
        log::info!("Loading model bundle from: {}", path.display());

        if !path.exists() {
            return Err(ModelLoadError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let text = std::fs::read_to_string(path).map_err(|source| ModelLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: BundleFile = serde_json::from_str(&text).map_err(|source| ModelLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let bundle = Self::from_file(file, base_dir, path.display().to_string())?;

        log::info!(
            "Model bundle loaded: {} ({}, {} features, layout {:08x})",
            bundle.metadata.name,
            bundle.metadata.kind,
            bundle.metadata.feature_count,
            bundle.metadata.layout_hash
        );
        Ok(bundle)
    }

    /// Parse a bundle from a JSON string. ONNX paths resolve against `base_dir`.
    pub fn from_json_str(json: &str, base_dir: &Path) -> Result<Self, ModelLoadError> {
        let file: BundleFile = serde_json::from_str(json).map_err(|source| ModelLoadError::Parse {
            path: PathBuf::from("<memory>"),
            source,
        })?;
        Self::from_file(file, base_dir, "<memory>".to_string())
    }

    fn from_file(file: BundleFile, base_dir: &Path, source: String) -> Result<Self, ModelLoadError> {
        if file.format_version != BUNDLE_FORMAT_VERSION {
            return Err(ModelLoadError::UnsupportedVersion {
                found: file.format_version,
                expected: BUNDLE_FORMAT_VERSION,
            });
        }

        let layout = FeatureLayout::from_wire_names(&file.features)?;

        let classifier: Box<dyn Classifier> = match file.model {
            ModelSpec::Catboost(model) => {
                let compiled = CatBoostClassifier::compile(model)?;
                log::info!("CatBoost model compiled: {} trees", compiled.tree_count());
                Box::new(compiled)
            }
            ModelSpec::Onnx { path } => load_onnx(&base_dir.join(path), layout.len())?,
        };

        let mut bundle = Self::from_parts(layout, classifier, source)?;
        if let Some(name) = file.name {
            bundle.metadata.name = name;
        }
        Ok(bundle)
    }

    /// Assemble a bundle from an already-built classifier
    pub fn from_parts(
        layout: FeatureLayout,
        classifier: Box<dyn Classifier>,
        source: impl Into<String>,
    ) -> Result<Self, ModelLoadError> {
        if classifier.feature_count() != layout.len() {
            return Err(ModelLoadError::FeatureCountMismatch {
                declared: layout.len(),
                model: classifier.feature_count(),
            });
        }

        let metadata = ModelMetadata {
            name: classifier.kind().to_string(),
            source: source.into(),
            kind: classifier.kind().to_string(),
            feature_count: layout.len(),
            layout_hash: layout.hash(),
            loaded_at: Utc::now(),
        };

        Ok(Self {
            layout,
            classifier,
            metadata,
        })
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn kind(&self) -> &'static str {
        self.classifier.kind()
    }

    /// Positive-class probability for a vector arranged with this bundle's layout
    pub fn predict_proba(&self, vector: &FeatureVector) -> Result<f64, PredictError> {
        if !vector.matches(&self.layout) {
            return Err(PredictError::LayoutMismatch {
                expected: self.layout.hash(),
                actual: vector.layout_hash,
            });
        }

        Ok(self.classifier.predict_proba(vector.as_slice())?)
    }
}

#[cfg(feature = "onnx")]
fn load_onnx(path: &Path, feature_count: usize) -> Result<Box<dyn Classifier>, ModelLoadError> {
    let classifier = super::onnx::OnnxClassifier::load(path, feature_count).map_err(ModelLoadError::Onnx)?;
    Ok(Box::new(classifier))
}

#[cfg(not(feature = "onnx"))]
fn load_onnx(path: &Path, _feature_count: usize) -> Result<Box<dyn Classifier>, ModelLoadError> {
    Err(ModelLoadError::OnnxDisabled {
        path: path.to_path_buf(),
    })
}

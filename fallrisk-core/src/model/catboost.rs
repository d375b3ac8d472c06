//! CatBoost JSON Evaluator
//!
//! Evaluates binary classifiers exported with
//! `model.save_model(path, format="json")`. Only float features are
//! supported, which covers every column the predictor form produces.
//!
//! Oblivious trees: each tree applies the same split at every level, so the
//! leaf is addressed by a bit mask. Bit `i` is set when
//! `x[column(split_i)] > border_i`.

use serde::Deserialize;
use thiserror::Error;

use super::inference::{check_probability, check_width, Classifier, InferenceError};

/// Deepest oblivious tree CatBoost can train
pub const MAX_TREE_DEPTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatBoostError {
    #[error("model has no trees")]
    NoTrees,

    #[error("categorical/text features are not supported ({0} found)")]
    UnsupportedFeatures(usize),

    #[error("tree {tree}: unsupported split type {split_type}")]
    UnsupportedSplit { tree: usize, split_type: String },

    #[error("tree {tree}: split is missing {field}")]
    IncompleteSplit { tree: usize, field: &'static str },

    #[error("tree {tree}: float feature {index} is not declared")]
    UnknownFeature { tree: usize, index: usize },

    #[error("tree {tree}: depth {depth} exceeds the limit of {}", MAX_TREE_DEPTH)]
    TooDeep { tree: usize, depth: usize },

    #[error("tree {tree}: depth {depth} needs {expected} leaf values, found {actual}")]
    LeafCount {
        tree: usize,
        depth: usize,
        expected: usize,
        actual: usize,
    },

    #[error("multi-dimensional bias is not supported ({0} values)")]
    MultiBias(usize),
}

// ============================================================================
// JSON SCHEMA
// ============================================================================

/// CatBoost JSON export, as written by `save_model(format="json")`.
/// Unknown sections (`model_info`, `features_info.*` stats) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CatBoostModel {
    #[serde(default)]
    pub features_info: FeaturesInfo,
    pub oblivious_trees: Vec<ObliviousTree>,
    #[serde(default)]
    pub scale_and_bias: ScaleAndBias,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeaturesInfo {
    #[serde(default)]
    pub float_features: Vec<FloatFeature>,
    #[serde(default)]
    pub categorical_features: Vec<serde_json::Value>,
    #[serde(default)]
    pub text_features: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FloatFeature {
    pub feature_index: usize,
    #[serde(default)]
    pub flat_feature_index: Option<usize>,
    #[serde(default)]
    pub borders: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObliviousTree {
    pub leaf_values: Vec<f64>,
    #[serde(default)]
    pub splits: Vec<Split>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Split {
    #[serde(default)]
    pub split_type: Option<String>,
    #[serde(default)]
    pub float_feature_index: Option<usize>,
    #[serde(default)]
    pub border: Option<f64>,
}

/// `[scale, [bias]]` in current exports, `[scale, bias]` in older ones
#[derive(Debug, Clone, Deserialize)]
pub struct ScaleAndBias(pub f64, pub Bias);

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Bias {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl Default for ScaleAndBias {
    fn default() -> Self {
        ScaleAndBias(1.0, Bias::Scalar(0.0))
    }
}

// ============================================================================
// COMPILED MODEL
// ============================================================================

#[derive(Debug, Clone)]
struct CompiledTree {
    /// (column, border) per level, least significant bit first
    splits: Vec<(usize, f64)>,
    leaf_values: Vec<f64>,
}

impl CompiledTree {
    fn leaf_value(&self, features: &[f64]) -> f64 {
        let index = self
            .splits
            .iter()
            .enumerate()
            .fold(0usize, |index, (depth, &(column, border))| {
                if features[column] > border {
                    index | (1 << depth)
                } else {
                    index
                }
            });
        self.leaf_values[index]
    }
}

/// Ready-to-evaluate CatBoost binary classifier
#[derive(Debug, Clone)]
pub struct CatBoostClassifier {
    trees: Vec<CompiledTree>,
    scale: f64,
    bias: f64,
    feature_count: usize,
}

impl CatBoostClassifier {
    /// Validate the exported model and resolve split columns
    pub fn compile(model: CatBoostModel) -> Result<Self, CatBoostError> {
        let info = &model.features_info;
        let unsupported = info.categorical_features.len() + info.text_features.len();
        if unsupported > 0 {
            return Err(CatBoostError::UnsupportedFeatures(unsupported));
        }
        if model.oblivious_trees.is_empty() {
            return Err(CatBoostError::NoTrees);
        }

        let columns: Vec<usize> = info
            .float_features
            .iter()
            .map(|f| f.flat_feature_index.unwrap_or(f.feature_index))
            .collect();
        let feature_count = columns.iter().map(|c| c + 1).max().unwrap_or(0);

        let mut trees = Vec::with_capacity(model.oblivious_trees.len());
        for (tree_idx, tree) in model.oblivious_trees.into_iter().enumerate() {
            let mut splits = Vec::with_capacity(tree.splits.len());
            for split in &tree.splits {
                if let Some(kind) = split.split_type.as_deref() {
                    if kind != "FloatFeature" {
                        return Err(CatBoostError::UnsupportedSplit {
                            tree: tree_idx,
                            split_type: kind.to_string(),
                        });
                    }
                }
                let index = split.float_feature_index.ok_or(CatBoostError::IncompleteSplit {
                    tree: tree_idx,
                    field: "float_feature_index",
                })?;
                let border = split.border.ok_or(CatBoostError::IncompleteSplit {
                    tree: tree_idx,
                    field: "border",
                })?;
                let column = *columns.get(index).ok_or(CatBoostError::UnknownFeature {
                    tree: tree_idx,
                    index,
                })?;
                splits.push((column, border));
            }

            let depth = splits.len();
            if depth > MAX_TREE_DEPTH {
                return Err(CatBoostError::TooDeep { tree: tree_idx, depth });
            }
            let expected = 1usize << depth;
            if tree.leaf_values.len() != expected {
                return Err(CatBoostError::LeafCount {
                    tree: tree_idx,
                    depth,
                    expected,
                    actual: tree.leaf_values.len(),
                });
            }

            trees.push(CompiledTree {
                splits,
                leaf_values: tree.leaf_values,
            });
        }

        let ScaleAndBias(scale, bias) = model.scale_and_bias;
        let bias = match bias {
            Bias::Scalar(b) => b,
            Bias::Vector(v) if v.len() == 1 => v[0],
            Bias::Vector(v) if v.is_empty() => 0.0,
            Bias::Vector(v) => return Err(CatBoostError::MultiBias(v.len())),
        };

        Ok(Self {
            trees,
            scale,
            bias,
            feature_count,
        })
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Raw log-odds before the sigmoid
    pub fn raw_score(&self, features: &[f64]) -> Result<f64, InferenceError> {
        check_width(self.feature_count, features)?;
        let sum: f64 = self.trees.iter().map(|t| t.leaf_value(features)).sum();
        Ok(self.scale * sum + self.bias)
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl Classifier for CatBoostClassifier {
    fn kind(&self) -> &'static str {
        "catboost"
    }

    fn feature_count(&self) -> usize {
        self.feature_count
    }

    fn predict_proba(&self, features: &[f64]) -> Result<f64, InferenceError> {
        let raw = self.raw_score(features)?;
        check_probability(sigmoid(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two float features, two trees
    const SMALL_MODEL: &str = r#"{
        "features_info": {
            "float_features": [
                {"feature_index": 0, "flat_feature_index": 0, "borders": [1.5], "has_nans": false},
                {"feature_index": 1, "flat_feature_index": 1, "borders": [10.0, 20.0]}
            ]
        },
        "oblivious_trees": [
            {
                "leaf_values": [-1.0, 0.5, 0.25, 2.0],
                "splits": [
                    {"border": 1.5, "float_feature_index": 0, "split_index": 0, "split_type": "FloatFeature"},
                    {"border": 10.0, "float_feature_index": 1, "split_index": 1, "split_type": "FloatFeature"}
                ]
            },
            {
                "leaf_values": [0.1, -0.3],
                "splits": [
                    {"border": 20.0, "float_feature_index": 1, "split_index": 2, "split_type": "FloatFeature"}
                ]
            }
        ],
        "scale_and_bias": [1.0, [0.2]],
        "model_info": {"params": "{}"}
    }"#;

    fn small() -> CatBoostClassifier {
        let model: CatBoostModel = serde_json::from_str(SMALL_MODEL).unwrap();
        CatBoostClassifier::compile(model).unwrap()
    }

    #[test]
    fn test_compile_small_model() {
        let clf = small();
        assert_eq!(clf.tree_count(), 2);
        assert_eq!(clf.feature_count(), 2);
        assert_eq!(clf.kind(), "catboost");
    }

    #[test]
    fn test_leaf_selection() {
        let clf = small();
        // x0 <= 1.5, x1 <= 10 -> leaf 0 of tree 0, leaf 0 of tree 1
        assert!((clf.raw_score(&[1.0, 5.0]).unwrap() - (-1.0 + 0.1 + 0.2)).abs() < 1e-12);
        // x0 > 1.5 only -> bit 0
        assert!((clf.raw_score(&[2.0, 5.0]).unwrap() - (0.5 + 0.1 + 0.2)).abs() < 1e-12);
        // x1 > 10 only -> bit 1
        assert!((clf.raw_score(&[1.0, 15.0]).unwrap() - (0.25 + 0.1 + 0.2)).abs() < 1e-12);
        // both, and x1 > 20 in tree 1
        assert!((clf.raw_score(&[2.0, 25.0]).unwrap() - (2.0 - 0.3 + 0.2)).abs() < 1e-12);
    }

    #[test]
    fn test_border_is_strict() {
        let clf = small();
        // Equal to border goes left
        assert!((clf.raw_score(&[1.5, 10.0]).unwrap() - (-1.0 + 0.1 + 0.2)).abs() < 1e-12);
    }

    #[test]
    fn test_probability_is_sigmoid() {
        let clf = small();
        let raw: f64 = 2.0 - 0.3 + 0.2;
        let expected = 1.0 / (1.0 + (-raw).exp());
        let p = clf.predict_proba(&[2.0, 25.0]).unwrap();
        assert!((p - expected).abs() < 1e-12);
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn test_scale_applies_before_bias() {
        let json = SMALL_MODEL.replace("[1.0, [0.2]]", "[2.0, 0.2]");
        let clf = CatBoostClassifier::compile(serde_json::from_str(&json).unwrap()).unwrap();
        let raw = clf.raw_score(&[1.0, 5.0]).unwrap();
        assert!((raw - (2.0 * (-1.0 + 0.1) + 0.2)).abs() < 1e-12);
    }

    #[test]
    fn test_wrong_width_rejected() {
        let clf = small();
        assert_eq!(
            clf.predict_proba(&[1.0]),
            Err(InferenceError::FeatureCount { expected: 2, actual: 1 })
        );
    }

    #[test]
    fn test_deterministic() {
        let clf = small();
        let row = [1.7, 12.0];
        let first = clf.predict_proba(&row).unwrap();
        for _ in 0..10 {
            assert_eq!(clf.predict_proba(&row).unwrap(), first);
        }
    }

    #[test]
    fn test_leaf_count_mismatch() {
        let json = SMALL_MODEL.replace("[0.1, -0.3]", "[0.1, -0.3, 0.4]");
        let err = CatBoostClassifier::compile(serde_json::from_str(&json).unwrap()).unwrap_err();
        assert_eq!(
            err,
            CatBoostError::LeafCount { tree: 1, depth: 1, expected: 2, actual: 3 }
        );
    }

    #[test]
    fn test_too_deep_tree_rejected() {
        let split = r#"{"border": 1.5, "float_feature_index": 0, "split_type": "FloatFeature"}"#;
        let splits = vec![split; 64].join(", ");
        let json = format!(
            r#"{{
                "features_info": {{"float_features": [{{"feature_index": 0, "borders": [1.5]}}]}},
                "oblivious_trees": [{{"leaf_values": [0.0], "splits": [{splits}]}}]
            }}"#
        );
        let err = CatBoostClassifier::compile(serde_json::from_str(&json).unwrap()).unwrap_err();
        assert_eq!(err, CatBoostError::TooDeep { tree: 0, depth: 64 });
    }

    #[test]
    fn test_max_depth_accepted() {
        let split = r#"{"border": 1.5, "float_feature_index": 0, "split_type": "FloatFeature"}"#;
        let splits = vec![split; MAX_TREE_DEPTH].join(", ");
        let leaves = vec!["0.0"; 1 << MAX_TREE_DEPTH].join(", ");
        let json = format!(
            r#"{{
                "features_info": {{"float_features": [{{"feature_index": 0, "borders": [1.5]}}]}},
                "oblivious_trees": [{{"leaf_values": [{leaves}], "splits": [{splits}]}}]
            }}"#
        );
        let clf = CatBoostClassifier::compile(serde_json::from_str(&json).unwrap()).unwrap();
        assert_eq!(clf.raw_score(&[2.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_categorical_rejected() {
        let json = SMALL_MODEL.replace(
            "\"float_features\": [",
            "\"categorical_features\": [{\"feature_index\": 2}], \"float_features\": [",
        );
        let err = CatBoostClassifier::compile(serde_json::from_str(&json).unwrap()).unwrap_err();
        assert_eq!(err, CatBoostError::UnsupportedFeatures(1));
    }

    #[test]
    fn test_undeclared_feature_rejected() {
        let json = SMALL_MODEL.replace(
            "{\"border\": 20.0, \"float_feature_index\": 1",
            "{\"border\": 20.0, \"float_feature_index\": 7",
        );
        let err = CatBoostClassifier::compile(serde_json::from_str(&json).unwrap()).unwrap_err();
        assert_eq!(err, CatBoostError::UnknownFeature { tree: 1, index: 7 });
    }

    #[test]
    fn test_no_trees_rejected() {
        let model: CatBoostModel = serde_json::from_str(r#"{"oblivious_trees": []}"#).unwrap();
        assert_eq!(CatBoostClassifier::compile(model).unwrap_err(), CatBoostError::NoTrees);
    }
}

//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! The form always produces the same eleven fields. A trained model declares
//! its own column order, so every record is re-arranged into a
//! [`FeatureLayout`] built from the model bundle before inference.
//! A wrong order does not fail loudly, it silently corrupts predictions.

use std::fmt;
use std::str::FromStr;

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// FEATURE NAMES
// ============================================================================

/// The closed set of fields the predictor form collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureName {
    #[serde(rename = "Gender")]
    Gender,
    #[serde(rename = "Height")]
    Height,
    #[serde(rename = "Hypertension")]
    Hypertension,
    #[serde(rename = "ODI")]
    Odi,
    #[serde(rename = "VAS")]
    Vas,
    #[serde(rename = "PS_Velocity")]
    PsVelocity,
    #[serde(rename = "PS_Sway_Area")]
    PsSwayArea,
    #[serde(rename = "PS_Sway_Path")]
    PsSwayPath,
    #[serde(rename = "W_Velocity")]
    WVelocity,
    #[serde(rename = "W_Duration")]
    WDuration,
    #[serde(rename = "Medication_Count")]
    MedicationCount,
}

/// Form order. This is the order fields are entered, NOT the model order.
pub const FORM_FIELDS: [FeatureName; FEATURE_COUNT] = [
    FeatureName::Gender,
    FeatureName::Height,
    FeatureName::Hypertension,
    FeatureName::Odi,
    FeatureName::Vas,
    FeatureName::PsVelocity,
    FeatureName::PsSwayArea,
    FeatureName::PsSwayPath,
    FeatureName::WVelocity,
    FeatureName::WDuration,
    FeatureName::MedicationCount,
];

/// Fields measured with the Lockhart Monitor app and transcribed by hand.
/// A zero in any of them means "not measured yet".
pub const DEVICE_MEASURED: [FeatureName; 5] = [
    FeatureName::PsVelocity,
    FeatureName::PsSwayArea,
    FeatureName::PsSwayPath,
    FeatureName::WVelocity,
    FeatureName::WDuration,
];

/// Total number of form fields
/// IMPORTANT: Must match FORM_FIELDS.len()!
pub const FEATURE_COUNT: usize = 11;

impl FeatureName {
    /// Column name used by the model bundle
    pub fn wire_name(self) -> &'static str {
        match self {
            FeatureName::Gender => "Gender",
            FeatureName::Height => "Height",
            FeatureName::Hypertension => "Hypertension",
            FeatureName::Odi => "ODI",
            FeatureName::Vas => "VAS",
            FeatureName::PsVelocity => "PS_Velocity",
            FeatureName::PsSwayArea => "PS_Sway_Area",
            FeatureName::PsSwayPath => "PS_Sway_Path",
            FeatureName::WVelocity => "W_Velocity",
            FeatureName::WDuration => "W_Duration",
            FeatureName::MedicationCount => "Medication_Count",
        }
    }

    /// Human readable label, used in warnings
    pub fn label(self) -> &'static str {
        match self {
            FeatureName::Gender => "Gender",
            FeatureName::Height => "Height",
            FeatureName::Hypertension => "Hypertension",
            FeatureName::Odi => "ODI Score",
            FeatureName::Vas => "Low Back Pain (VAS)",
            FeatureName::PsVelocity => "Postural Stability Velocity",
            FeatureName::PsSwayArea => "Postural Stability Sway Area",
            FeatureName::PsSwayPath => "Postural Stability Sway Path",
            FeatureName::WVelocity => "Walking Velocity",
            FeatureName::WDuration => "Walking Duration",
            FeatureName::MedicationCount => "Medication Count",
        }
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for FeatureName {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FORM_FIELDS
            .iter()
            .copied()
            .find(|name| name.wire_name() == s)
            .ok_or_else(|| LayoutError::UnknownFeature(s.to_string()))
    }
}

// ============================================================================
// LAYOUT ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("feature list is empty")]
    Empty,

    #[error("unknown feature name: {0}")]
    UnknownFeature(String),

    #[error("feature listed twice: {0}")]
    Duplicate(FeatureName),

    #[error("feature list is missing form fields: {}", join_names(.0))]
    MissingFields(Vec<FeatureName>),
}

fn join_names(names: &[FeatureName]) -> String {
    names.iter().map(|n| n.wire_name()).collect::<Vec<_>>().join(", ")
}

// ============================================================================
// FEATURE LAYOUT
// ============================================================================

/// Ordered feature list a model was trained on, with its fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureLayout {
    names: Vec<FeatureName>,
    hash: u32,
}

impl FeatureLayout {
    /// Build a layout from an ordered list of distinct names
    pub fn new(names: Vec<FeatureName>) -> Result<Self, LayoutError> {
        if names.is_empty() {
            return Err(LayoutError::Empty);
        }

        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(LayoutError::Duplicate(*name));
            }
        }

        let hash = compute_layout_hash(&names);
        Ok(Self { names, hash })
    }

    /// Build a layout from the column names stored in a model bundle.
    ///
    /// Every form field must appear exactly once: a model that ignores a
    /// field the form collects, or expects one it doesn't, is a schema
    /// mismatch.
    pub fn from_wire_names<S: AsRef<str>>(names: &[S]) -> Result<Self, LayoutError> {
        let parsed = names
            .iter()
            .map(|s| s.as_ref().parse::<FeatureName>())
            .collect::<Result<Vec<_>, _>>()?;

        let layout = Self::new(parsed)?;

        let missing: Vec<FeatureName> = FORM_FIELDS
            .iter()
            .copied()
            .filter(|f| !layout.names.contains(f))
            .collect();
        if !missing.is_empty() {
            return Err(LayoutError::MissingFields(missing));
        }

        Ok(layout)
    }

    /// The form order itself
    pub fn form_order() -> Self {
        let names = FORM_FIELDS.to_vec();
        let hash = compute_layout_hash(&names);
        Self { names, hash }
    }

    pub fn names(&self) -> &[FeatureName] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// CRC32 fingerprint of the ordered names
    pub fn hash(&self) -> u32 {
        self.hash
    }

    pub fn wire_names(&self) -> Vec<String> {
        self.names.iter().map(|n| n.wire_name().to_string()).collect()
    }
}

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of an ordered feature list.
/// Used to detect layout mismatches at inference time.
pub fn compute_layout_hash(names: &[FeatureName]) -> u32 {
    let mut hasher = Hasher::new();

    for name in names {
        hasher.update(name.wire_name().as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Layout information for serialization/logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub hash: u32,
    /// Same hash as 8 hex digits, as printed in logs
    pub hash_hex: String,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl From<&FeatureLayout> for LayoutInfo {
    fn from(layout: &FeatureLayout) -> Self {
        Self {
            hash: layout.hash(),
            hash_hex: format!("{:08x}", layout.hash()),
            feature_count: layout.len(),
            feature_names: layout.wire_names(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

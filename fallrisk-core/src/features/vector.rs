//! Feature Vector - model input arranged for one specific layout
//!
//! Carries the layout hash it was built for, so the model can refuse a
//! vector arranged for a different column order.

use serde::{Deserialize, Serialize};

use super::layout::FeatureLayout;
use super::record::FeatureRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// CRC32 hash of the layout these values follow
    pub layout_hash: u32,
    /// Values in layout order
    pub values: Vec<f64>,
}

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check this vector was arranged for `layout`
    pub fn matches(&self, layout: &FeatureLayout) -> bool {
        self.layout_hash == layout.hash() && self.values.len() == layout.len()
    }

    /// JSON form for logging
    pub fn to_log_entry(&self, layout: &FeatureLayout) -> serde_json::Value {
        serde_json::json!({
            "layout_hash": format!("{:08x}", self.layout_hash),
            "named_values": layout.names().iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.wire_name().to_string(), serde_json::Value::from(*value)))
                .collect::<serde_json::Map<_, _>>(),
        })
    }
}

impl FeatureLayout {
    /// Arrange a record's values in this layout's order
    pub fn arrange(&self, record: &FeatureRecord) -> FeatureVector {
        FeatureVector {
            layout_hash: self.hash(),
            values: self.names().iter().map(|&name| record.value(name)).collect(),
        }
    }
}

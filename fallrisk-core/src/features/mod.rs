//! Features Module - form fields and model input layout
//!
//! - `layout` - feature names, model column order, layout hash
//! - `record` - values entered on the form
//! - `vector` - record arranged in a model's column order

pub mod layout;
pub mod record;
pub mod vector;


pub use layout::{
    FeatureLayout, FeatureName, LayoutError, LayoutInfo, DEVICE_MEASURED, FEATURE_COUNT, FORM_FIELDS,
};
pub use record::{FeatureRecord, GENDER_FEMALE, GENDER_MALE};
pub use vector::FeatureVector;

//! Predictor form submission
//!
//! Shared by the HTML form (urlencoded) and the JSON API. Field names match
//! the model's column names. Bounds mirror the form inputs; the browser
//! enforces them too, but a request can come from anywhere.

use fallrisk_core::FeatureRecord;
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PredictForm {
    #[serde(rename = "Gender")]
    #[validate(range(min = 0, max = 1, message = "Gender must be 0 (Female) or 1 (Male)"))]
    pub gender: u8,

    #[serde(rename = "Height")]
    #[validate(range(min = 80.0, max = 250.0, message = "Height must be between 80 and 250 cm"))]
    pub height: f64,

    #[serde(rename = "Hypertension")]
    #[validate(range(min = 0, max = 1, message = "Hypertension must be 0 (No) or 1 (Yes)"))]
    pub hypertension: u8,

    #[serde(rename = "ODI")]
    #[validate(range(min = 0.0, max = 100.0, message = "ODI Score must be between 0 and 100"))]
    pub odi: f64,

    #[serde(rename = "VAS")]
    #[validate(range(min = 0.0, max = 10.0, message = "VAS must be between 0 and 10"))]
    pub vas: f64,

    #[serde(rename = "PS_Velocity", default)]
    pub ps_velocity: f64,

    #[serde(rename = "PS_Sway_Area", default)]
    pub ps_sway_area: f64,

    #[serde(rename = "PS_Sway_Path", default)]
    pub ps_sway_path: f64,

    #[serde(rename = "W_Velocity", default)]
    pub w_velocity: f64,

    #[serde(rename = "W_Duration", default)]
    pub w_duration: f64,

    #[serde(rename = "Medication_Count")]
    #[validate(range(max = 50, message = "Medication Count must be between 0 and 50"))]
    pub medication_count: u32,
}

impl PredictForm {
    /// Run the bound checks; messages are sorted for stable output
    pub fn check(&self) -> Result<(), Vec<String>> {
        let mut messages = Vec::new();

        if let Err(errors) = self.validate() {
            for field_errors in errors.field_errors().values() {
                for error in field_errors.iter() {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    messages.push(message);
                }
            }
        }

        // Range checks let NaN through, and device fields have no range
        let record = FeatureRecord::from(self.clone());
        for (name, value) in record.entries() {
            if !value.is_finite() {
                messages.push(format!("{} must be a finite number", name.label()));
            }
        }

        if messages.is_empty() {
            Ok(())
        } else {
            messages.sort();
            Err(messages)
        }
    }
}

impl From<PredictForm> for FeatureRecord {
    fn from(form: PredictForm) -> Self {
        FeatureRecord {
            gender: form.gender,
            height: form.height,
            hypertension: form.hypertension,
            odi: form.odi,
            vas: form.vas,
            ps_velocity: form.ps_velocity,
            ps_sway_area: form.ps_sway_area,
            ps_sway_path: form.ps_sway_path,
            w_velocity: form.w_velocity,
            w_duration: form.w_duration,
            medication_count: form.medication_count,
        }
    }
}

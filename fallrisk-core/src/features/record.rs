//! Feature Record - one participant's form entries

use serde::{Deserialize, Serialize};

use super::layout::{FeatureName, DEVICE_MEASURED, FORM_FIELDS};

/// Gender coding used by the model
pub const GENDER_FEMALE: u8 = 0;
pub const GENDER_MALE: u8 = 1;

/// Values entered on the predictor form.
///
/// Field names follow the model's column names on the wire so a JSON body
/// reads the same as the bundle's feature list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// Female = 0, Male = 1
    #[serde(rename = "Gender")]
    pub gender: u8,
    /// Height in cm
    #[serde(rename = "Height")]
    pub height: f64,
    /// 0 = No, 1 = Yes
    #[serde(rename = "Hypertension")]
    pub hypertension: u8,
    #[serde(rename = "ODI")]
    pub odi: f64,
    #[serde(rename = "VAS")]
    pub vas: f64,

    /// cm/s
    #[serde(rename = "PS_Velocity", default)]
    pub ps_velocity: f64,
    /// cm²
    #[serde(rename = "PS_Sway_Area", default)]
    pub ps_sway_area: f64,
    /// cm
    #[serde(rename = "PS_Sway_Path", default)]
    pub ps_sway_path: f64,
    /// m/s
    #[serde(rename = "W_Velocity", default)]
    pub w_velocity: f64,
    /// seconds
    #[serde(rename = "W_Duration", default)]
    pub w_duration: f64,

    #[serde(rename = "Medication_Count")]
    pub medication_count: u32,
}

impl Default for FeatureRecord {
    /// Initial form values
    fn default() -> Self {
        Self {
            gender: GENDER_FEMALE,
            height: 170.0,
            hypertension: 0,
            odi: 10.0,
            vas: 2.0,
            ps_velocity: 0.0,
            ps_sway_area: 0.0,
            ps_sway_path: 0.0,
            w_velocity: 0.0,
            w_duration: 0.0,
            medication_count: 0,
        }
    }
}

impl FeatureRecord {
    /// Numeric value of a field as fed to the model
    pub fn value(&self, name: FeatureName) -> f64 {
        match name {
            FeatureName::Gender => f64::from(self.gender),
            FeatureName::Height => self.height,
            FeatureName::Hypertension => f64::from(self.hypertension),
            FeatureName::Odi => self.odi,
            FeatureName::Vas => self.vas,
            FeatureName::PsVelocity => self.ps_velocity,
            FeatureName::PsSwayArea => self.ps_sway_area,
            FeatureName::PsSwayPath => self.ps_sway_path,
            FeatureName::WVelocity => self.w_velocity,
            FeatureName::WDuration => self.w_duration,
            FeatureName::MedicationCount => f64::from(self.medication_count),
        }
    }

    /// Device-measured fields still at exactly zero, in form order.
    ///
    /// A real zero reading cannot be told apart from "not measured", so it
    /// is reported as missing too.
    pub fn missing_measurements(&self) -> Vec<FeatureName> {
        DEVICE_MEASURED
            .iter()
            .copied()
            .filter(|&name| self.value(name) == 0.0)
            .collect()
    }

    /// (name, value) pairs in form order, for logging
    pub fn entries(&self) -> impl Iterator<Item = (FeatureName, f64)> + '_ {
        FORM_FIELDS.iter().map(move |&name| (name, self.value(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_form() {
        let record = FeatureRecord::default();
        assert_eq!(record.gender, GENDER_FEMALE);
        assert_eq!(record.height, 170.0);
        assert_eq!(record.odi, 10.0);
        assert_eq!(record.vas, 2.0);
        assert_eq!(record.missing_measurements(), DEVICE_MEASURED.to_vec());
    }

    #[test]
    fn test_value_lookup() {
        let record = FeatureRecord {
            gender: GENDER_MALE,
            hypertension: 1,
            medication_count: 7,
            w_duration: 6.2,
            ..Default::default()
        };
        assert_eq!(record.value(FeatureName::Gender), 1.0);
        assert_eq!(record.value(FeatureName::Hypertension), 1.0);
        assert_eq!(record.value(FeatureName::MedicationCount), 7.0);
        assert_eq!(record.value(FeatureName::WDuration), 6.2);
    }

    #[test]
    fn test_missing_measurements_lists_only_zeros() {
        let record = FeatureRecord {
            ps_velocity: 12.3,
            ps_sway_path: 30.0,
            w_duration: 6.2,
            ..Default::default()
        };
        assert_eq!(
            record.missing_measurements(),
            vec![FeatureName::PsSwayArea, FeatureName::WVelocity]
        );
    }

    #[test]
    fn test_negative_zero_counts_as_missing() {
        let record = FeatureRecord {
            ps_velocity: -0.0,
            ps_sway_area: 4.5,
            ps_sway_path: 30.0,
            w_velocity: 0.9,
            w_duration: 6.2,
            ..Default::default()
        };
        assert_eq!(record.missing_measurements(), vec![FeatureName::PsVelocity]);
    }

    #[test]
    fn test_json_uses_column_names() {
        let json = r#"{
            "Gender": 1, "Height": 165.5, "Hypertension": 0,
            "ODI": 22.0, "VAS": 4.5, "PS_Velocity": 1.2,
            "Medication_Count": 3
        }"#;
        let record: FeatureRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.gender, 1);
        assert_eq!(record.ps_velocity, 1.2);
        assert_eq!(record.ps_sway_area, 0.0);
        assert_eq!(record.medication_count, 3);
    }
}

//! Predictor - form entries in, fall-risk prediction out
//!
//! Pure and synchronous: no rendering, no retries, no state kept between
//! calls. The web layer calls this once per submission.

use thiserror::Error;

use crate::features::{FeatureName, FeatureRecord};
use crate::model::{InferenceError, ModelBundle, PredictionResult, RiskLabel, FALLER_THRESHOLD};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    /// One or more device fields left at zero. Recoverable: ask the user to
    /// finish the measurements.
    #[error("Missing or zero values: {}", missing_labels(.fields))]
    MissingMeasurement { fields: Vec<FeatureName> },

    #[error("feature vector layout {actual:08x} does not match model layout {expected:08x}")]
    LayoutMismatch { expected: u32, actual: u32 },

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

fn missing_labels(fields: &[FeatureName]) -> String {
    fields.iter().map(|f| f.label()).collect::<Vec<_>>().join(", ")
}

impl PredictError {
    /// Labels of the missing fields, empty for other errors
    pub fn missing_fields(&self) -> &[FeatureName] {
        match self {
            PredictError::MissingMeasurement { fields } => fields,
            _ => &[],
        }
    }
}

/// Check that every device-measured field was supplied
pub fn validate(record: &FeatureRecord) -> Result<(), PredictError> {
    let fields = record.missing_measurements();
    if fields.is_empty() {
        Ok(())
    } else {
        Err(PredictError::MissingMeasurement { fields })
    }
}

/// Validate the record, run the classifier on it in the bundle's column
/// order and label the result.
pub fn validate_and_predict(
    bundle: &ModelBundle,
    record: &FeatureRecord,
) -> Result<PredictionResult, PredictError> {
    validate(record)?;

    let vector = bundle.layout().arrange(record);
    if log::log_enabled!(log::Level::Debug) {
        log::debug!("Feature vector: {}", vector.to_log_entry(bundle.layout()));
    }

    let probability = bundle.predict_proba(&vector)?;
    let label = RiskLabel::from_probability(probability);

    log::debug!("Prediction: p={:.3} label={}", probability, label.code());

    Ok(PredictionResult {
        probability,
        label,
        threshold: FALLER_THRESHOLD,
        method: bundle.kind().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FeatureLayout, DEVICE_MEASURED, FEATURE_COUNT, FORM_FIELDS};
    use crate::model::Classifier;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Returns a fixed probability and remembers what it was given
    struct RecordingClassifier {
        probability: f64,
        calls: Arc<AtomicUsize>,
        last_row: Arc<Mutex<Vec<f64>>>,
    }

    impl Classifier for RecordingClassifier {
        fn kind(&self) -> &'static str {
            "recording"
        }

        fn feature_count(&self) -> usize {
            FEATURE_COUNT
        }

        fn predict_proba(&self, features: &[f64]) -> Result<f64, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_row.lock().unwrap() = features.to_vec();
            if (0.0..=1.0).contains(&self.probability) {
                Ok(self.probability)
            } else {
                Err(InferenceError::InvalidProbability(self.probability))
            }
        }
    }

    struct Harness {
        bundle: ModelBundle,
        calls: Arc<AtomicUsize>,
        last_row: Arc<Mutex<Vec<f64>>>,
    }

    fn harness(layout: FeatureLayout, probability: f64) -> Harness {
        let calls = Arc::new(AtomicUsize::new(0));
        let last_row = Arc::new(Mutex::new(Vec::new()));
        let classifier = RecordingClassifier {
            probability,
            calls: calls.clone(),
            last_row: last_row.clone(),
        };
        let bundle = ModelBundle::from_parts(layout, Box::new(classifier), "test").unwrap();
        Harness { bundle, calls, last_row }
    }

    fn measured_record() -> FeatureRecord {
        FeatureRecord {
            ps_velocity: 12.3,
            ps_sway_area: 4.5,
            ps_sway_path: 30.0,
            w_velocity: 0.9,
            w_duration: 6.2,
            ..Default::default()
        }
    }

    fn set_device_field(record: &mut FeatureRecord, name: FeatureName, value: f64) {
        match name {
            FeatureName::PsVelocity => record.ps_velocity = value,
            FeatureName::PsSwayArea => record.ps_sway_area = value,
            FeatureName::PsSwayPath => record.ps_sway_path = value,
            FeatureName::WVelocity => record.w_velocity = value,
            FeatureName::WDuration => record.w_duration = value,
            other => panic!("{other} is not device-measured"),
        }
    }

    #[test]
    fn test_every_zero_combination_is_reported() {
        let h = harness(FeatureLayout::form_order(), 0.7);

        // All 31 non-empty subsets of the five device fields
        for mask in 1u32..(1 << DEVICE_MEASURED.len()) {
            let mut record = measured_record();
            let mut expected = Vec::new();
            for (bit, &name) in DEVICE_MEASURED.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    set_device_field(&mut record, name, 0.0);
                    expected.push(name);
                }
            }

            let err = validate_and_predict(&h.bundle, &record).unwrap_err();
            assert_eq!(err, PredictError::MissingMeasurement { fields: expected });
        }

        assert_eq!(h.calls.load(Ordering::SeqCst), 0, "classifier must not run");
    }

    #[test]
    fn test_all_device_fields_missing_message() {
        let h = harness(FeatureLayout::form_order(), 0.7);
        let err = validate_and_predict(&h.bundle, &FeatureRecord::default()).unwrap_err();

        assert_eq!(err.missing_fields(), &DEVICE_MEASURED[..]);
        assert_eq!(
            err.to_string(),
            "Missing or zero values: Postural Stability Velocity, Postural Stability Sway Area, \
             Postural Stability Sway Path, Walking Velocity, Walking Duration"
        );
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_classifier_receives_model_order() {
        let mut names = FORM_FIELDS.to_vec();
        names.rotate_left(4);
        names.swap(0, 6);
        let layout = FeatureLayout::new(names.clone()).unwrap();
        let h = harness(layout, 0.2);

        let record = FeatureRecord {
            gender: 1,
            height: 181.0,
            hypertension: 1,
            odi: 35.5,
            vas: 7.1,
            medication_count: 9,
            ..measured_record()
        };
        validate_and_predict(&h.bundle, &record).unwrap();

        let row = h.last_row.lock().unwrap().clone();
        let expected: Vec<f64> = names.iter().map(|&n| record.value(n)).collect();
        assert_eq!(row, expected);
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_label_follows_threshold() {
        for (p, label) in [
            (0.0, RiskLabel::NonFaller),
            (0.499, RiskLabel::NonFaller),
            (0.5, RiskLabel::Faller),
            (0.93, RiskLabel::Faller),
            (1.0, RiskLabel::Faller),
        ] {
            let h = harness(FeatureLayout::form_order(), p);
            let result = validate_and_predict(&h.bundle, &measured_record()).unwrap();
            assert_eq!(result.probability, p);
            assert_eq!(result.label, label);
            assert_eq!(result.threshold, FALLER_THRESHOLD);
            assert_eq!(result.method, "recording");
        }
    }

    #[test]
    fn test_out_of_range_probability_is_error() {
        let h = harness(FeatureLayout::form_order(), 1.5);
        let err = validate_and_predict(&h.bundle, &measured_record()).unwrap_err();
        assert_eq!(err, PredictError::Inference(InferenceError::InvalidProbability(1.5)));
    }

    #[test]
    fn test_foreign_vector_rejected() {
        let h = harness(FeatureLayout::form_order(), 0.3);
        let mut names = FORM_FIELDS.to_vec();
        names.reverse();
        let other = FeatureLayout::new(names).unwrap();

        let vector = other.arrange(&measured_record());
        let err = h.bundle.predict_proba(&vector).unwrap_err();
        assert!(matches!(err, PredictError::LayoutMismatch { .. }));
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_validate_accepts_negative_measurements() {
        // Only exact zero means "not measured"
        let record = FeatureRecord {
            ps_velocity: -1.0,
            ..measured_record()
        };
        assert!(validate(&record).is_ok());
    }
}

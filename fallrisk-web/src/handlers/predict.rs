//! Prediction API handler

use std::time::Instant;

use axum::{extract::State, Json};
use fallrisk_core::{validate_and_predict, FeatureRecord, PredictError, PredictionResult};
use serde::Serialize;

use crate::models::PredictForm;
use crate::{AppError, AppResult, AppState};

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    #[serde(flatten)]
    pub result: PredictionResult,
    /// "High Fall Risk" / "Low Fall Risk"
    pub banner: &'static str,
    pub model: String,
}

/// Run one prediction and keep the counters current.
/// Used by both the JSON API and the HTML form.
pub fn run_prediction(state: &AppState, record: &FeatureRecord) -> Result<PredictionResult, PredictError> {
    let start = Instant::now();

    match validate_and_predict(&state.bundle, record) {
        Ok(result) => {
            let elapsed = start.elapsed();
            state.stats.record_inference(elapsed);
            tracing::info!(
                probability = result.probability,
                label = result.label.name(),
                latency_us = elapsed.as_micros() as u64,
                "Prediction computed"
            );
            Ok(result)
        }
        Err(PredictError::MissingMeasurement { fields }) => {
            state.stats.record_rejected();
            tracing::debug!(missing = ?fields, "Prediction skipped, measurements missing");
            Err(PredictError::MissingMeasurement { fields })
        }
        Err(e) => {
            tracing::error!("Prediction failed: {}", e);
            Err(e)
        }
    }
}

/// POST /api/v1/predict
pub async fn predict(
    State(state): State<AppState>,
    Json(form): Json<PredictForm>,
) -> AppResult<Json<PredictResponse>> {
    form.check()
        .map_err(|messages| AppError::ValidationError(messages.join("; ")))?;

    let record = FeatureRecord::from(form);
    let result = run_prediction(&state, &record)?;

    Ok(Json(PredictResponse {
        banner: result.label.banner(),
        model: state.bundle.metadata().name.clone(),
        result,
    }))
}

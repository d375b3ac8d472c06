//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use fallrisk_core::{FeatureName, PredictError};
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Input outside the form's bounds
    #[error("validation error: {0}")]
    ValidationError(String),

    // Device fields still at zero
    #[error("missing measurements: {0:?}")]
    MissingMeasurement(Vec<FeatureName>),

    // Model could not produce a prediction
    #[error("prediction failed: {0}")]
    PredictionFailed(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::MissingMeasurement(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                PredictError::MissingMeasurement { fields: self.missing_fields().to_vec() }.to_string(),
            ),
            AppError::PredictionFailed(msg) => {
                tracing::error!("Prediction failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Prediction failed".to_string())
            }
        };

        let mut body = json!({
            "error": error_message,
            "status": status.as_u16()
        });
        if let AppError::MissingMeasurement(fields) = &self {
            body["missing_fields"] = json!(fields);
        }

        (status, Json(body)).into_response()
    }
}

impl AppError {
    fn missing_fields(&self) -> &[FeatureName] {
        match self {
            AppError::MissingMeasurement(fields) => fields,
            _ => &[],
        }
    }
}

impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        match err {
            PredictError::MissingMeasurement { fields } => AppError::MissingMeasurement(fields),
            other => AppError::PredictionFailed(other.to_string()),
        }
    }
}

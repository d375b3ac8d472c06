//! Predictor page handlers
//!
//! Every submission re-renders the whole page from scratch.

use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::Html,
    Form,
};
use fallrisk_core::{FeatureRecord, PredictError};

use super::predict::run_prediction;
use crate::models::PredictForm;
use crate::render::{self, Outcome};
use crate::AppState;

/// GET / - empty form with default values
pub async fn show() -> Html<String> {
    Html(render::page(&FeatureRecord::default(), &Outcome::Empty))
}

/// POST / - validate, predict, render
pub async fn submit(
    State(state): State<AppState>,
    form: Result<Form<PredictForm>, FormRejection>,
) -> (StatusCode, Html<String>) {
    // Blank or non-numeric fields never reach the bound checks
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => {
            tracing::debug!("Form rejected: {}", rejection.body_text());
            let outcome = Outcome::Invalid(vec![format!(
                "Every field needs a number ({})",
                rejection.body_text()
            )]);
            return (
                StatusCode::BAD_REQUEST,
                Html(render::page(&FeatureRecord::default(), &outcome)),
            );
        }
    };

    let checked = form.check();
    let record = FeatureRecord::from(form);

    let (status, outcome) = match checked {
        Err(messages) => (StatusCode::BAD_REQUEST, Outcome::Invalid(messages)),
        Ok(()) => match run_prediction(&state, &record) {
            Ok(result) => (StatusCode::OK, Outcome::Prediction(result)),
            Err(PredictError::MissingMeasurement { fields }) => (StatusCode::OK, Outcome::Missing(fields)),
            Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, Outcome::Failed),
        },
    };

    (status, Html(render::page(&record, &outcome)))
}

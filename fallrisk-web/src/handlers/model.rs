//! Model status handler

use axum::{extract::State, Json};
use fallrisk_core::{LayoutInfo, ModelMetadata, FALLER_THRESHOLD};
use serde::Serialize;

use crate::stats::StatsSnapshot;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ModelStatus {
    #[serde(flatten)]
    pub metadata: ModelMetadata,
    /// Column order the model expects
    pub layout: LayoutInfo,
    pub threshold: f64,
    #[serde(flatten)]
    pub stats: StatsSnapshot,
}

/// GET /api/v1/model
pub async fn status(State(state): State<AppState>) -> Json<ModelStatus> {
    Json(ModelStatus {
        metadata: state.bundle.metadata().clone(),
        layout: LayoutInfo::from(state.bundle.layout()),
        threshold: FALLER_THRESHOLD,
        stats: state.stats.snapshot(),
    })
}

//! Fall Risk Predictor - Web Server
//!
//! Serves the one-page predictor form and a small JSON API.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   FALL RISK PREDICTOR                    │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌────────────┐   ┌────────────┐   ┌──────────────────┐  │
//! │  │  Form (/)  │   │  JSON API  │   │  Status / Health │  │
//! │  └─────┬──────┘   └─────┬──────┘   └────────┬─────────┘  │
//! │        └────────────────┼───────────────────┘            │
//! │                         ▼                                │
//! │           validate_and_predict (fallrisk-core)           │
//! │                         ▼                                │
//! │             Arc<ModelBundle> (read-only)                 │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod models;
mod render;
mod stats;


use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use fallrisk_core::ModelBundle;
use tower_http::{
    compression::CompressionLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};
use stats::InferenceStats;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env first so RUST_LOG from it applies
    dotenvy::dotenv().ok();

    let config = config::Config::from_env();

    // Initialize logging; core's `log` records are bridged in by `init`
    let json_logs = config.json_logs();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "fallrisk_web=debug,fallrisk_core=info,tower_http=debug".into()))
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("{} starting ({})...", fallrisk_core::constants::APP_NAME, config.environment);

    // The model is required; no bundle, no server
    let bundle = ModelBundle::load(&config.model_path)
        .with_context(|| format!("Failed to load model bundle {}", config.model_path.display()))?;

    tracing::info!(
        "Model '{}' ({}) expects features: {}",
        bundle.metadata().name,
        bundle.kind(),
        bundle.layout().wire_names().join(", ")
    );

    let state = AppState {
        bundle: Arc::new(bundle),
        stats: Arc::new(InferenceStats::default()),
        config: config.clone(),
    };

    let app = create_router(state);

    let addr = SocketAddr::new(config.bind_addr, config.port);
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await
        .context("Server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub bundle: Arc<ModelBundle>,
    pub stats: Arc<InferenceStats>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::form::show).post(handlers::form::submit))
        .route("/health", get(handlers::health::check))
        .route("/api/v1/predict", post(handlers::predict::predict))
        .route("/api/v1/model", get(handlers::model::status))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

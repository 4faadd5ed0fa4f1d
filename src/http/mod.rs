// src/http/mod.rs
// HTTP surface (spec §6): health/liveness/readiness, metrics, and the
// knowledge/pipeline/graph routes explicitly enumerated in the spec. Session,
// memory, fact, and governance are consumed by the agent-framework
// collaborator directly and are deliberately not HTTP-routed here.

pub mod app_name;
pub mod error;
pub mod health;
pub mod knowledge;
pub mod pipelines;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::EngineConfig;
use crate::state::ServerState;

pub fn router(state: Arc<ServerState>, config: &EngineConfig) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/live", get(health::liveness_check))
        .route("/metrics", get(crate::metrics::metrics_handler))
        .merge(knowledge::router(config.ingestion.max_upload_bytes as usize))
        .merge(pipelines::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

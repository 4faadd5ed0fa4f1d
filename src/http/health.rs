// src/http/health.rs
// Health, readiness, and liveness probes for load balancers and orchestrators.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::state::ServerState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
}

/// GET /health
pub async fn health_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let db_ok = crate::db::ping(&state.pool).await;
    let response = HealthResponse {
        status: if db_ok { "healthy" } else { "unhealthy" },
        database: if db_ok { "ok" } else { "error" },
    };
    if db_ok {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

/// GET /ready
pub async fn readiness_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let ready = crate::db::ping(&state.pool).await;
    if ready {
        (StatusCode::OK, Json(serde_json::json!({"status": "ready"})))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(serde_json::json!({"status": "not_ready"})))
    }
}

/// GET /live
pub async fn liveness_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({"status": "alive"})))
}

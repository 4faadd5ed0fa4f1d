// src/http/pipelines.rs
// Pipeline / graph run observability and upsert (spec §6). Graph behavior
// itself is an optional, out-of-scope collaborator (spec §9 Open Questions);
// these endpoints expose the same PipelineRun-shaped bookkeeping row without
// implementing entity extraction or neighbor search.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use super::app_name::AppName;
use super::error::ApiError;
use crate::knowledge::{DashboardSummary, UpsertRun};
use crate::models::{GraphRun, PipelineRun};
use crate::state::ServerState;

pub fn router() -> Router<Arc<ServerState>> {
    Router::new()
        .route("/knowledge/dashboard", get(dashboard))
        .route("/knowledge/pipelines", get(list_pipelines).post(upsert_pipeline))
        .route("/knowledge/graph", get(list_graph_runs).post(upsert_graph_run))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    offset: usize,
}

fn default_limit() -> usize {
    20
}

async fn dashboard(
    AppName(app_name): AppName,
    State(state): State<Arc<ServerState>>,
) -> Result<Json<DashboardSummary>, ApiError> {
    let summary = state.pipeline_repo.dashboard_summary(&app_name).await?;
    Ok(Json(summary))
}

async fn list_pipelines(
    AppName(app_name): AppName,
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<PipelineRun>>, ApiError> {
    let runs = state.pipeline_repo.list_pipeline_runs(&app_name, query.limit, query.offset).await?;
    Ok(Json(runs))
}

async fn upsert_pipeline(
    AppName(app_name): AppName,
    State(state): State<Arc<ServerState>>,
    Json(req): Json<UpsertRun>,
) -> Result<Json<PipelineRun>, ApiError> {
    let run = state.pipeline_repo.upsert_pipeline_run(&app_name, req).await?;
    Ok(Json(run))
}

async fn list_graph_runs(
    AppName(app_name): AppName,
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<GraphRun>>, ApiError> {
    let runs = state.pipeline_repo.list_graph_runs(&app_name, query.limit, query.offset).await?;
    Ok(Json(runs))
}

async fn upsert_graph_run(
    AppName(app_name): AppName,
    State(state): State<Arc<ServerState>>,
    Json(req): Json<UpsertRun>,
) -> Result<Json<GraphRun>, ApiError> {
    let run = state.pipeline_repo.upsert_graph_run(&app_name, req).await?;
    Ok(Json(run))
}

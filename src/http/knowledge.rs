// src/http/knowledge.rs
// Corpus CRUD, ingestion, search, and chunk listing (spec §6).

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::app_name::AppName;
use super::error::ApiError;
use crate::error::DomainError;
use crate::knowledge::retrieval::RetrievalMode;
use crate::knowledge::IngestSource;
use crate::models::{Corpus, Knowledge};
use crate::providers::EmbeddingProvider;
use crate::state::ServerState;

pub fn router(max_upload_bytes: usize) -> Router<Arc<ServerState>> {
    Router::new()
        .route("/knowledge/base", post(create_corpus).get(list_corpora))
        .route("/knowledge/base/{id}", patch(update_corpus).delete(delete_corpus))
        .route("/knowledge/base/{id}/ingest", post(ingest_text))
        .route("/knowledge/base/{id}/ingest_url", post(ingest_url))
        .route(
            "/knowledge/base/{id}/ingest_file",
            post(ingest_file).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/knowledge/base/{id}/replace_source", post(replace_source))
        .route("/knowledge/base/{id}/sync_source", post(sync_source))
        .route("/knowledge/base/{id}/search", post(search_corpus))
        .route("/knowledge/base/{id}/knowledge", get(list_chunks))
}

#[derive(Debug, Deserialize)]
struct CreateCorpusRequest {
    name: String,
    description: Option<String>,
    #[serde(default)]
    config: Value,
}

async fn create_corpus(
    AppName(app_name): AppName,
    State(state): State<Arc<ServerState>>,
    Json(req): Json<CreateCorpusRequest>,
) -> Result<Json<Corpus>, ApiError> {
    let corpus = state
        .knowledge_repo
        .create_corpus(&app_name, &req.name, req.description.as_deref(), req.config)
        .await?;
    Ok(Json(corpus))
}

#[derive(Debug, Deserialize)]
struct ListCorporaQuery {
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    offset: usize,
}

fn default_limit() -> usize {
    20
}

/// List is scoped by a corpus the caller already knows the id of is not
/// meaningful here; this endpoint returns the caller's corpora. Spec §6
/// names `GET /knowledge/base` for corpus listing without pagination
/// parameters beyond the generic ones used elsewhere in this module.
async fn list_corpora(
    AppName(app_name): AppName,
    State(state): State<Arc<ServerState>>,
    Query(_query): Query<ListCorporaQuery>,
) -> Result<Json<Vec<Corpus>>, ApiError> {
    let corpora = state.knowledge_repo.list_corpora(&app_name).await?;
    Ok(Json(corpora))
}

#[derive(Debug, Deserialize)]
struct UpdateCorpusRequest {
    name: Option<String>,
    description: Option<String>,
    config: Option<Value>,
}

async fn update_corpus(
    AppName(app_name): AppName,
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCorpusRequest>,
) -> Result<Json<Corpus>, ApiError> {
    let existing = state
        .knowledge_repo
        .get_corpus(&app_name, id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("corpus {id}")))?;

    let name = req.name.unwrap_or(existing.name);
    let description = req.description.or(existing.description);
    let config = req.config.unwrap_or(existing.config);

    let updated = state
        .knowledge_repo
        .update_corpus(&app_name, id, &name, description.as_deref(), config)
        .await?;

    Ok(Json(updated))
}

async fn delete_corpus(
    AppName(app_name): AppName,
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
) -> Result<axum::http::StatusCode, ApiError> {
    state.knowledge_repo.delete_corpus(&app_name, id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct IngestTextRequest {
    text: String,
    source_uri: Option<String>,
}

async fn ingest_text(
    AppName(app_name): AppName,
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<IngestTextRequest>,
) -> Result<Json<crate::models::PipelineRun>, ApiError> {
    let run = state
        .ingestion
        .ingest(&app_name, id, IngestSource::Text { source_uri: req.source_uri, text: req.text })
        .await?;
    Ok(Json(run))
}

#[derive(Debug, Deserialize)]
struct IngestUrlRequest {
    url: String,
}

async fn ingest_url(
    AppName(app_name): AppName,
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<IngestUrlRequest>,
) -> Result<Json<crate::models::PipelineRun>, ApiError> {
    let run = state.ingestion.ingest(&app_name, id, IngestSource::Url { url: req.url }).await?;
    Ok(Json(run))
}

/// Same stage pipeline as `ingest_url`/`ingest_text`; `replace_source` and
/// `sync_source` (spec §4.5 table) differ only in the caller's intent, not
/// in this pipeline's mechanics — the "delete" stage always runs for any
/// source with a `source_uri`, which already gives replace/sync semantics.
async fn replace_source(
    AppName(app_name): AppName,
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<IngestTextRequest>,
) -> Result<Json<crate::models::PipelineRun>, ApiError> {
    ingest_text(AppName(app_name), State(state), Path(id), Json(req)).await
}

async fn sync_source(
    AppName(app_name): AppName,
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<IngestUrlRequest>,
) -> Result<Json<crate::models::PipelineRun>, ApiError> {
    ingest_url(AppName(app_name), State(state), Path(id), Json(req)).await
}

/// Multipart upload (spec §6: `ingest_file`, enforced at the router layer
/// via `DefaultBodyLimit`). Bytes are deduplicated by content hash before
/// being chunked and embedded (spec §4.5 "Deduplication on upload").
async fn ingest_file(
    AppName(app_name): AppName,
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<IngestFileResponse>, ApiError> {
    let mut filename = "upload.bin".to_string();
    let mut content_type = "application/octet-stream".to_string();
    let mut bytes: Vec<u8> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| DomainError::InvalidArgument(e.to_string()))? {
        if field.name() == Some("file") {
            filename = field.file_name().unwrap_or("upload.bin").to_string();
            content_type = field.content_type().unwrap_or("application/octet-stream").to_string();
            bytes = field.bytes().await.map_err(|e| DomainError::InvalidArgument(e.to_string()))?.to_vec();
        }
    }
    if bytes.is_empty() {
        return Err(DomainError::InvalidArgument("missing 'file' field".to_string()).into());
    }

    let sanitized = crate::models::knowledge::sanitize_filename(&filename);
    let gcs_uri = format!("knowledge/{app_name}/{id}/{sanitized}");

    let (document, created) = state
        .knowledge_repo
        .register_document(&app_name, id, &filename, &gcs_uri, Some(&content_type), &bytes)
        .await?;

    if created {
        let text = crate::knowledge::extraction::extract_text(&content_type, &bytes)?;
        state
            .ingestion
            .ingest(&app_name, id, IngestSource::Text { source_uri: Some(gcs_uri.clone()), text })
            .await?;
    }

    Ok(Json(IngestFileResponse { document, deduplicated: !created }))
}

#[derive(Debug, Serialize)]
struct IngestFileResponse {
    document: crate::models::KnowledgeDocument,
    deduplicated: bool,
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    query: String,
    mode: String,
    #[serde(default = "default_limit")]
    limit: usize,
    semantic_weight: Option<f64>,
    keyword_weight: Option<f64>,
    metadata_filter: Option<Value>,
}

async fn search_corpus(
    AppName(app_name): AppName,
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<Vec<crate::knowledge::retrieval::ScoredChunk>>, ApiError> {
    let mode = RetrievalMode::parse(&req.mode)
        .ok_or_else(|| DomainError::InvalidArgument(format!("unknown search mode '{}'", req.mode)))?;

    // Semantic/hybrid/rrf modes need a query embedding; without a configured
    // embedder those modes degrade to whatever RetrievalEngine does with a
    // `None` embedding (keyword-only results), same as the absent-embedder
    // ingestion path.
    let query_embedding = match &state.embedder {
        Some(embedder) => {
            Some(embedder.embed(&req.query).await.map_err(|e| DomainError::EmbeddingFailed(e.to_string()))?)
        }
        None => None,
    };

    // Per-request weight overrides are folded into the engine's configured
    // defaults by temporarily constructing a scoped engine; the shared engine
    // owns the pool, so build a lightweight override only when requested.
    let results = if req.semantic_weight.is_some() || req.keyword_weight.is_some() {
        let mut config = state.retrieval.config().clone();
        if let Some(w) = req.semantic_weight {
            config.semantic_weight = w;
        }
        if let Some(w) = req.keyword_weight {
            config.keyword_weight = w;
        }
        let engine = crate::knowledge::retrieval::RetrievalEngine::new(state.pool.clone(), config);
        engine.search(&app_name, id, &req.query, query_embedding.clone(), mode, req.metadata_filter, req.limit).await?
    } else {
        state
            .retrieval
            .search(&app_name, id, &req.query, query_embedding, mode, req.metadata_filter, req.limit)
            .await?
    };

    Ok(Json(results))
}

#[derive(Debug, Deserialize)]
struct ListChunksQuery {
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    offset: usize,
    source_uri: Option<String>,
}

async fn list_chunks(
    AppName(app_name): AppName,
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<ListChunksQuery>,
) -> Result<Json<Vec<Knowledge>>, ApiError> {
    let rows = state
        .knowledge_repo
        .list_knowledge(&app_name, id, query.source_uri.as_deref(), query.limit, query.offset)
        .await?;
    Ok(Json(rows))
}

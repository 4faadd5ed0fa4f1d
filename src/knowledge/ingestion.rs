// src/knowledge/ingestion.rs
// Ingestion pipeline (spec §4.5): fetch -> extract -> delete -> chunk -> embed
// -> persist, with per-stage PipelineRun tracking.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use super::chunking::{chunk_text, ChunkingParams};
use super::repository::{KnowledgeRepository, NewKnowledgeChunk};
use crate::config::knowledge::ChunkingConfig;
use crate::config::server::RateLimitConfig;
use crate::error::{DomainError, DomainResult};
use crate::models::pipeline::StageRecord;
use crate::models::{Knowledge, PipelineRun};
use crate::providers::EmbeddingProvider;
use crate::utils::with_retry;

#[derive(Debug, Clone)]
pub enum IngestSource {
    Text { source_uri: Option<String>, text: String },
    Url { url: String },
}

pub struct IngestionPipeline {
    pool: PgPool,
    repo: KnowledgeRepository,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    http: reqwest::Client,
    chunking: ChunkingConfig,
    rate_limit: RateLimitConfig,
}

impl IngestionPipeline {
    pub fn new(
        pool: PgPool,
        embedder: Option<Arc<dyn EmbeddingProvider>>,
        http: reqwest::Client,
        chunking: ChunkingConfig,
        rate_limit: RateLimitConfig,
    ) -> Self {
        let repo = KnowledgeRepository::new(pool.clone());
        Self {
            pool,
            repo,
            embedder,
            http,
            chunking,
            rate_limit,
        }
    }

    pub async fn ingest(&self, app_name: &str, corpus_id: Uuid, source: IngestSource) -> DomainResult<PipelineRun> {
        let run_id = Uuid::new_v4().to_string();
        let mut stages: serde_json::Map<String, Value> = serde_json::Map::new();

        let fetch_result = self.run_stage(app_name, &mut stages, "fetch", || async {
            match &source {
                IngestSource::Text { source_uri, text } => Ok((source_uri.clone(), text.clone())),
                IngestSource::Url { url } => {
                    let (content_type, bytes) = with_retry(
                        Duration::from_secs(self.rate_limit.fetch_timeout_secs),
                        Duration::from_secs(self.rate_limit.base_backoff_secs),
                        self.rate_limit.max_retries,
                        "web fetch",
                        || async {
                            let response = self.http.get(url).send().await?;
                            let content_type = response
                                .headers()
                                .get(reqwest::header::CONTENT_TYPE)
                                .and_then(|v| v.to_str().ok())
                                .map(str::to_string)
                                .unwrap_or_else(|| super::extraction::guess_content_type(url));
                            let bytes = response.bytes().await?;
                            Ok((content_type, bytes))
                        },
                    )
                    .await
                    .map_err(|e| DomainError::ContentFetchFailed(e.to_string()))?;
                    let text = super::extraction::extract_text(&content_type, &bytes)?;
                    Ok((Some(url.clone()), text))
                }
            }
        })
        .await;

        let (source_uri, text) = match fetch_result {
            Ok(v) => v,
            Err(run) => return Ok(run),
        };

        if let Some(uri) = &source_uri {
            let deleted = self
                .run_stage(app_name, &mut stages, "delete", || async {
                    self.repo.delete_by_source(app_name, corpus_id, uri).await
                })
                .await;
            match deleted {
                Ok(count) => {
                    stages.insert("delete_count".to_string(), json!(count));
                }
                Err(run) => return Ok(run),
            }
        }

        let params = ChunkingParams {
            chunk_size: self.chunking.chunk_size,
            overlap: self.chunking.overlap as i64,
            preserve_newlines: self.chunking.preserve_newlines,
        };
        let chunked = self
            .run_stage(app_name, &mut stages, "chunk", || async { Ok::<_, DomainError>(chunk_text(&text, params)) })
            .await;
        let pieces = match chunked {
            Ok(p) => p,
            Err(run) => return Ok(run),
        };

        let embeddings = if let Some(embedder) = &self.embedder {
            let embedded = self
                .run_stage(app_name, &mut stages, "embed", || async {
                    let vectors = with_retry(
                        Duration::from_secs(self.rate_limit.embedding_timeout_secs),
                        Duration::from_secs(self.rate_limit.base_backoff_secs),
                        self.rate_limit.max_retries,
                        "embed_batch",
                        || embedder.embed_batch(&pieces),
                    )
                    .await
                    .map_err(|e| DomainError::EmbeddingFailed(e.to_string()))?;
                    Ok(vectors.into_iter().map(Some).collect::<Vec<_>>())
                })
                .await;
            match embedded {
                Ok(v) => v,
                Err(run) => return Ok(run),
            }
        } else {
            vec![None; pieces.len()]
        };

        let new_chunks: Vec<NewKnowledgeChunk> = pieces
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(index, (content, embedding))| NewKnowledgeChunk {
                corpus_id,
                app_name: app_name.to_string(),
                content,
                embedding,
                source_uri: source_uri.clone(),
                chunk_index: index as i64,
                metadata: json!({}),
            })
            .collect();

        let chunk_count = new_chunks.len();
        let persisted = self
            .run_stage(app_name, &mut stages, "persist", || async { self.repo.insert_chunks(new_chunks.clone()).await })
            .await;
        let persisted: Vec<Knowledge> = match persisted {
            Ok(p) => p,
            Err(run) => return Ok(run),
        };

        let payload = json!({
            "stages": stages,
            "chunk_count": chunk_count,
            "persisted_count": persisted.len(),
        });

        let run = sqlx::query_as::<_, PipelineRun>(
            r#"
            INSERT INTO pipeline_runs (id, app_name, run_id, status, payload, version, created_at, updated_at)
            VALUES ($1, $2, $3, 'completed', $4, 1, now(), now())
            RETURNING id, app_name, run_id, status, payload, idempotency_key, version, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(app_name)
        .bind(&run_id)
        .bind(payload)
        .fetch_one(&self.pool)
        .await?;

        Ok(run)
    }

    /// Runs one pipeline stage, recording its `StageRecord` into `stages` and,
    /// on failure, writing a terminal `failed` PipelineRun (spec §4.5: "a
    /// failed stage marks the run failed ... the run then ends").
    async fn run_stage<T, F, Fut>(
        &self,
        app_name: &str,
        stages: &mut serde_json::Map<String, Value>,
        name: &str,
        f: F,
    ) -> Result<T, PipelineRun>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = DomainResult<T>>,
    {
        let started_at = Utc::now();
        let start = Instant::now();
        match f().await {
            Ok(value) => {
                let record = StageRecord {
                    started_at,
                    completed_at: Some(Utc::now()),
                    duration_ms: Some(start.elapsed().as_millis() as i64),
                    status: "completed".to_string(),
                    output: json!({}),
                    error_type: None,
                    error_message: None,
                };
                stages.insert(name.to_string(), serde_json::to_value(record).unwrap_or(json!({})));
                Ok(value)
            }
            Err(e) => {
                let record = StageRecord {
                    started_at,
                    completed_at: Some(Utc::now()),
                    duration_ms: Some(start.elapsed().as_millis() as i64),
                    status: "failed".to_string(),
                    output: json!({}),
                    error_type: Some(e.code().to_string()),
                    error_message: Some(e.to_string()),
                };
                stages.insert(name.to_string(), serde_json::to_value(record).unwrap_or(json!({})));

                let payload = json!({ "stages": stages });
                let run_id = Uuid::new_v4().to_string();
                let failed = sqlx::query_as::<_, PipelineRun>(
                    r#"
                    INSERT INTO pipeline_runs (id, app_name, run_id, status, payload, version, created_at, updated_at)
                    VALUES ($1, $2, $3, 'failed', $4, 1, now(), now())
                    RETURNING id, app_name, run_id, status, payload, idempotency_key, version, created_at, updated_at
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(app_name)
                .bind(&run_id)
                .bind(payload)
                .fetch_one(&self.pool)
                .await;

                Err(failed.unwrap_or_else(|_| PipelineRun {
                    id: Uuid::new_v4(),
                    app_name: app_name.to_string(),
                    run_id,
                    status: "failed".to_string(),
                    payload: json!({ "stages": stages }),
                    idempotency_key: None,
                    version: 1,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                }))
            }
        }
    }
}

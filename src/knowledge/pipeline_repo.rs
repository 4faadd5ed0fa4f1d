// src/knowledge/pipeline_repo.rs
// PipelineRun / GraphRun observability and upsert (spec §4.5, §6 dashboard
// and pipeline/graph endpoints). Upsert follows the same idempotency-key
// short-circuit used by governance::audit_memory, generalized to a plain
// `(app_name, run_id)` row instead of a per-memory decision set.

use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::models::{GraphRun, PipelineRun};

pub struct PipelineRepository {
    pool: PgPool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsertRun {
    pub run_id: String,
    pub status: String,
    pub payload: Value,
    pub idempotency_key: Option<String>,
}

impl PipelineRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_pipeline_runs(&self, app_name: &str, limit: usize, offset: usize) -> DomainResult<Vec<PipelineRun>> {
        let rows = sqlx::query_as::<_, PipelineRun>(
            r#"SELECT id, app_name, run_id, status, payload, idempotency_key, version, created_at, updated_at
               FROM pipeline_runs WHERE app_name = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3"#,
        )
        .bind(app_name)
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Upserts a pipeline run. When `idempotency_key` is set and a run with
    /// that key already exists for `app_name`, it is returned unchanged.
    pub async fn upsert_pipeline_run(&self, app_name: &str, run: UpsertRun) -> DomainResult<PipelineRun> {
        if let Some(key) = &run.idempotency_key {
            if let Some(existing) = sqlx::query_as::<_, PipelineRun>(
                r#"SELECT id, app_name, run_id, status, payload, idempotency_key, version, created_at, updated_at
                   FROM pipeline_runs WHERE app_name = $1 AND idempotency_key = $2"#,
            )
            .bind(app_name)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?
            {
                return Ok(existing);
            }
        }

        let row = sqlx::query_as::<_, PipelineRun>(
            r#"
            INSERT INTO pipeline_runs (id, app_name, run_id, status, payload, idempotency_key, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, 1, now(), now())
            ON CONFLICT (app_name, run_id) DO UPDATE SET
                status = EXCLUDED.status,
                payload = EXCLUDED.payload,
                version = pipeline_runs.version + 1,
                updated_at = now()
            RETURNING id, app_name, run_id, status, payload, idempotency_key, version, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(app_name)
        .bind(&run.run_id)
        .bind(&run.status)
        .bind(&run.payload)
        .bind(&run.idempotency_key)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_graph_runs(&self, app_name: &str, limit: usize, offset: usize) -> DomainResult<Vec<GraphRun>> {
        let rows = sqlx::query_as::<_, GraphRun>(
            r#"SELECT id, app_name, run_id, status, payload, idempotency_key, version, created_at, updated_at
               FROM graph_runs WHERE app_name = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3"#,
        )
        .bind(app_name)
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn upsert_graph_run(&self, app_name: &str, run: UpsertRun) -> DomainResult<GraphRun> {
        if let Some(key) = &run.idempotency_key {
            if let Some(existing) = sqlx::query_as::<_, GraphRun>(
                r#"SELECT id, app_name, run_id, status, payload, idempotency_key, version, created_at, updated_at
                   FROM graph_runs WHERE app_name = $1 AND idempotency_key = $2"#,
            )
            .bind(app_name)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?
            {
                return Ok(existing);
            }
        }

        let row = sqlx::query_as::<_, GraphRun>(
            r#"
            INSERT INTO graph_runs (id, app_name, run_id, status, payload, idempotency_key, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, 1, now(), now())
            ON CONFLICT (app_name, run_id) DO UPDATE SET
                status = EXCLUDED.status,
                payload = EXCLUDED.payload,
                version = graph_runs.version + 1,
                updated_at = now()
            RETURNING id, app_name, run_id, status, payload, idempotency_key, version, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(app_name)
        .bind(&run.run_id)
        .bind(&run.status)
        .bind(&run.payload)
        .bind(&run.idempotency_key)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Aggregate counts for the dashboard endpoint.
    pub async fn dashboard_summary(&self, app_name: &str) -> DomainResult<DashboardSummary> {
        let row: (i64, i64, i64) = sqlx::query_as(
            r#"SELECT
                 count(*) FILTER (WHERE status = 'completed'),
                 count(*) FILTER (WHERE status = 'failed'),
                 count(*) FILTER (WHERE status = 'running')
               FROM pipeline_runs WHERE app_name = $1"#,
        )
        .bind(app_name)
        .fetch_one(&self.pool)
        .await
        .map_err(DomainError::from)?;

        Ok(DashboardSummary {
            completed_runs: row.0,
            failed_runs: row.1,
            running_runs: row.2,
        })
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DashboardSummary {
    pub completed_runs: i64,
    pub failed_runs: i64,
    pub running_runs: i64,
}

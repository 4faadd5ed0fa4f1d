// src/models/pipeline.rs
// PipelineRun / GraphRun — per-stage-tracked ingestion runs (spec §3, §4.5).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PipelineRun {
    pub id: Uuid,
    pub app_name: String,
    pub run_id: String,
    pub status: String,
    pub payload: Value,
    pub idempotency_key: Option<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// GraphRun shares the PipelineRun shape (spec §3); graph behavior itself is
/// out of scope per spec §9 Open Questions, so this is a pass-through record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GraphRun {
    pub id: Uuid,
    pub app_name: String,
    pub run_id: String,
    pub status: String,
    pub payload: Value,
    pub idempotency_key: Option<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One stage's recorded progress inside a PipelineRun's `payload.stages` map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageRecord {
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<i64>,
    pub status: String,
    pub output: Value,
    pub error_type: Option<String>,
    pub error_message: Option<String>,
}

// src/models/trace.rs
// Span — tracing core's persisted unit (spec §3, §4.6).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Span {
    pub trace_id: String,
    pub span_id: String,
    pub parent_span_id: Option<String>,
    pub operation_name: String,
    pub span_kind: String,
    pub attributes: Value,
    pub events: Value,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_ns: Option<i64>,
    pub status_code: String,
    pub status_message: Option<String>,
}

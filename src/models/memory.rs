// src/models/memory.rs
// Episodic Memory — spec §3, §4.2.

use chrono::{DateTime, Utc};
use pgvector::Vector;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Memory {
    pub id: Uuid,
    pub thread_id: Option<Uuid>,
    pub user_id: String,
    pub app_name: String,
    pub memory_type: String,
    pub content: String,
    #[serde(skip)]
    pub embedding: Option<Vector>,
    pub metadata: Value,
    pub retention_score: f64,
    pub access_count: i64,
    pub last_accessed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A memory row ranked by a search, carrying the relevance score (spec §4.2:
/// "every returned row also carries `retention_score` as `relevance_score`").
#[derive(Debug, Clone, Serialize)]
pub struct RankedMemory {
    pub memory: Memory,
    pub relevance_score: f64,
}

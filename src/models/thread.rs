// src/models/thread.rs
// Thread (conversation session) — spec §3.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Thread {
    pub id: Uuid,
    pub app_name: String,
    pub user_id: String,
    pub state: Value,
    pub metadata: Value,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Thread {
    pub fn title(&self) -> Option<&str> {
        self.metadata.get("title").and_then(|v| v.as_str())
    }
}

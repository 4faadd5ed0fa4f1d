// src/models/fact.rs
// Fact (semantic memory) — spec §3, §4.3.

use chrono::{DateTime, Utc};
use pgvector::Vector;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Fact {
    pub id: Uuid,
    pub thread_id: Option<Uuid>,
    pub user_id: String,
    pub app_name: String,
    pub fact_type: String,
    pub key: String,
    pub value: Value,
    #[serde(skip)]
    pub embedding: Option<Vector>,
    pub confidence: f64,
    pub valid_from: DateTime<Utc>,
    pub valid_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Fact {
    /// "Effective at time t" iff `valid_from <= t` and (`valid_until` is null
    /// or `valid_until > t`) — spec §3.
    pub fn is_effective_at(&self, t: DateTime<Utc>) -> bool {
        self.valid_from <= t && self.valid_until.map(|until| until > t).unwrap_or(true)
    }
}

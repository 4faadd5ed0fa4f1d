// src/models/audit.rs
// MemoryAuditLog and the AuditRecord result type — spec §3, §4.4.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Retain,
    Delete,
    Anonymize,
}

impl Decision {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "retain" => Some(Decision::Retain),
            "delete" => Some(Decision::Delete),
            "anonymize" => Some(Decision::Anonymize),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Retain => "retain",
            Decision::Delete => "delete",
            Decision::Anonymize => "anonymize",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MemoryAuditLog {
    pub id: Uuid,
    pub app_name: String,
    pub user_id: String,
    pub memory_id: Uuid,
    pub decision: String,
    pub note: Option<String>,
    pub idempotency_key: Option<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

/// The result returned by `audit_memory` for each memory_id in the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub memory_id: Uuid,
    pub decision: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

impl From<MemoryAuditLog> for AuditRecord {
    fn from(log: MemoryAuditLog) -> Self {
        Self {
            memory_id: log.memory_id,
            decision: log.decision,
            version: log.version,
            created_at: log.created_at,
        }
    }
}

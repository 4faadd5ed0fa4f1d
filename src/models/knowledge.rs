// src/models/knowledge.rs
// Corpus, Knowledge (chunk), and KnowledgeDocument — spec §3, §4.5.

use chrono::{DateTime, Utc};
use pgvector::Vector;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Corpus {
    pub id: Uuid,
    pub app_name: String,
    pub name: String,
    pub description: Option<String>,
    pub config: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Knowledge {
    pub id: Uuid,
    pub corpus_id: Uuid,
    pub app_name: String,
    pub content: String,
    #[serde(skip)]
    pub embedding: Option<Vector>,
    pub source_uri: Option<String>,
    pub chunk_index: i64,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Active,
    Deleted,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct KnowledgeDocument {
    pub id: Uuid,
    pub corpus_id: Uuid,
    pub app_name: String,
    /// 64-char hex SHA-256 of the raw uploaded bytes (spec §3, §4.5 dedup).
    pub file_hash: String,
    pub original_filename: String,
    pub gcs_uri: String,
    pub content_type: Option<String>,
    pub file_size: i64,
    pub status: String,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sanitizes an object-store object key component per spec §6:
/// strips path separators, restricts to `[\w一-鿿\-.]`, truncated to 255 chars.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| {
            c.is_alphanumeric() || *c == '_' || *c == '-' || *c == '.' || is_cjk(*c)
        })
        .collect();
    cleaned.chars().take(255).collect()
}

fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_path_separators() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "....etcpasswd");
    }

    #[test]
    fn sanitize_truncates_to_255() {
        let long = "a".repeat(300);
        assert_eq!(sanitize_filename(&long).len(), 255);
    }
}

// src/knowledge/retrieval/keyword.rs
// Keyword retrieval (spec §4.5 mode 2): full-text ranking against the
// precomputed `search_vector`, score = rank value.

use serde_json::Value;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::ScoredChunk;
use crate::error::DomainResult;

pub async fn search(
    pool: &PgPool,
    app_name: &str,
    corpus_id: Uuid,
    query: &str,
    metadata_filter: Option<&Value>,
    limit: usize,
) -> DomainResult<Vec<ScoredChunk>> {
    let rows = sqlx::query(
        r#"SELECT id, content, source_uri, metadata,
                  ts_rank(search_vector, websearch_to_tsquery('english', $1)) AS rank
           FROM knowledge
           WHERE app_name = $2 AND corpus_id = $3
             AND search_vector @@ websearch_to_tsquery('english', $1)
             AND ($4::jsonb IS NULL OR metadata @> $4::jsonb)
           ORDER BY rank DESC
           LIMIT $5"#,
    )
    .bind(query)
    .bind(app_name)
    .bind(corpus_id)
    .bind(metadata_filter)
    .bind(limit as i64)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let rank: f32 = row.get("rank");
            ScoredChunk {
                knowledge_id: row.get("id"),
                content: row.get("content"),
                source_uri: row.get("source_uri"),
                metadata: row.get("metadata"),
                semantic_score: None,
                keyword_score: Some(rank as f64),
                combined_score: rank as f64,
            }
        })
        .collect())
}

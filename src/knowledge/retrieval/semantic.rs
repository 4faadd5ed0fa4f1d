// src/knowledge/retrieval/semantic.rs
// Semantic retrieval (spec §4.5 mode 1): cosine distance ascending, score = 1 - distance.

use pgvector::Vector;
use serde_json::Value;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::ScoredChunk;
use crate::error::DomainResult;

pub async fn search(
    pool: &PgPool,
    app_name: &str,
    corpus_id: Uuid,
    query_embedding: Option<Vec<f32>>,
    metadata_filter: Option<&Value>,
    limit: usize,
) -> DomainResult<Vec<ScoredChunk>> {
    let Some(embedding) = query_embedding else {
        return Ok(Vec::new());
    };
    let vector = Vector::from(embedding);

    let rows = sqlx::query(
        r#"SELECT id, content, source_uri, metadata, embedding <=> $1 AS distance
           FROM knowledge
           WHERE app_name = $2 AND corpus_id = $3 AND embedding IS NOT NULL
             AND ($4::jsonb IS NULL OR metadata @> $4::jsonb)
           ORDER BY distance ASC
           LIMIT $5"#,
    )
    .bind(vector)
    .bind(app_name)
    .bind(corpus_id)
    .bind(metadata_filter)
    .bind(limit as i64)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let distance: f64 = row.get("distance");
            ScoredChunk {
                knowledge_id: row.get("id"),
                content: row.get("content"),
                source_uri: row.get("source_uri"),
                metadata: row.get("metadata"),
                semantic_score: Some(1.0 - distance),
                keyword_score: None,
                combined_score: 1.0 - distance,
            }
        })
        .collect())
}

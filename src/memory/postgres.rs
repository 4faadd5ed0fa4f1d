// src/memory/postgres.rs
// Postgres-backed MemoryStore. Grounded on
// original_source/.../memory_service.py for add/search semantics (spec §4.2).

use async_trait::async_trait;
use chrono::Utc;
use pgvector::Vector;
use sqlx::PgPool;
use uuid::Uuid;

use super::{MemoryStore, NewMemory};
use crate::error::DomainResult;
use crate::models::memory::RankedMemory;
use crate::models::Memory;
use crate::utils::escape_like_pattern;

pub struct PostgresMemoryStore {
    pool: PgPool,
}

impl PostgresMemoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemoryStore for PostgresMemoryStore {
    async fn add_memory(&self, memory: NewMemory) -> DomainResult<Memory> {
        let embedding = memory.embedding.map(Vector::from);
        let row = sqlx::query_as::<_, Memory>(
            r#"
            INSERT INTO memories
                (id, thread_id, user_id, app_name, memory_type, content, embedding, metadata,
                 retention_score, access_count, last_accessed_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 1.0, 0, now(), now(), now())
            RETURNING id, thread_id, user_id, app_name, memory_type, content, embedding, metadata,
                      retention_score, access_count, last_accessed_at, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(memory.thread_id)
        .bind(&memory.user_id)
        .bind(&memory.app_name)
        .bind(&memory.memory_type)
        .bind(&memory.content)
        .bind(embedding)
        .bind(&memory.metadata)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get_memory(&self, app_name: &str, memory_id: Uuid) -> DomainResult<Option<Memory>> {
        let row = sqlx::query_as::<_, Memory>(
            r#"SELECT id, thread_id, user_id, app_name, memory_type, content, embedding, metadata,
                      retention_score, access_count, last_accessed_at, created_at, updated_at
               FROM memories WHERE id = $1 AND app_name = $2"#,
        )
        .bind(memory_id)
        .bind(app_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn search_memory(
        &self,
        app_name: &str,
        user_id: &str,
        query: &str,
        query_embedding: Option<Vec<f32>>,
        limit: usize,
    ) -> DomainResult<Vec<RankedMemory>> {
        let rows: Vec<Memory> = if let Some(embedding) = query_embedding {
            // Nearest-neighbor vector search, cosine distance ascending (spec §4.2).
            let vector = Vector::from(embedding);
            sqlx::query_as::<_, Memory>(
                r#"SELECT id, thread_id, user_id, app_name, memory_type, content, embedding, metadata,
                          retention_score, access_count, last_accessed_at, created_at, updated_at
                   FROM memories
                   WHERE app_name = $1 AND user_id = $2 AND embedding IS NOT NULL
                   ORDER BY embedding <=> $3 ASC
                   LIMIT $4"#,
            )
            .bind(app_name)
            .bind(user_id)
            .bind(vector)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?
        } else {
            // Case-insensitive substring fallback, most-recent first.
            let pattern = format!("%{}%", escape_like_pattern(query));
            sqlx::query_as::<_, Memory>(
                r#"SELECT id, thread_id, user_id, app_name, memory_type, content, embedding, metadata,
                          retention_score, access_count, last_accessed_at, created_at, updated_at
                   FROM memories
                   WHERE app_name = $1 AND user_id = $2 AND content ILIKE $3
                   ORDER BY created_at DESC
                   LIMIT $4"#,
            )
            .bind(app_name)
            .bind(user_id)
            .bind(pattern)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?
        };

        // Every returned row carries its retention_score as relevance_score
        // (spec §4.2).
        Ok(rows
            .into_iter()
            .map(|m| RankedMemory {
                relevance_score: m.retention_score,
                memory: m,
            })
            .collect())
    }

    async fn list_memories(&self, app_name: &str, user_id: &str) -> DomainResult<Vec<Memory>> {
        let rows = sqlx::query_as::<_, Memory>(
            r#"SELECT id, thread_id, user_id, app_name, memory_type, content, embedding, metadata,
                      retention_score, access_count, last_accessed_at, created_at, updated_at
               FROM memories WHERE app_name = $1 AND user_id = $2 ORDER BY created_at DESC"#,
        )
        .bind(app_name)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn delete_memory(&self, app_name: &str, memory_id: Uuid) -> DomainResult<()> {
        sqlx::query("DELETE FROM memories WHERE id = $1 AND app_name = $2")
            .bind(memory_id)
            .bind(app_name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn record_access(&self, app_name: &str, memory_id: Uuid) -> DomainResult<()> {
        let now = Utc::now();
        sqlx::query(
            "UPDATE memories SET access_count = access_count + 1, last_accessed_at = $1, updated_at = $1 \
             WHERE id = $2 AND app_name = $3",
        )
        .bind(now)
        .bind(memory_id)
        .bind(app_name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

// src/knowledge/repository.rs
// Corpus / Knowledge / KnowledgeDocument persistence (spec §4.5, §9 supplement
// grounded on original_source/.../knowledge/api.py's corpus CRUD + pagination).

use pgvector::Vector;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::models::{Corpus, Knowledge, KnowledgeDocument};
use crate::utils::hash::sha256_hash_bytes;

pub struct KnowledgeRepository {
    pool: PgPool,
}

impl KnowledgeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_corpus(
        &self,
        app_name: &str,
        name: &str,
        description: Option<&str>,
        config: serde_json::Value,
    ) -> DomainResult<Corpus> {
        let row = sqlx::query_as::<_, Corpus>(
            r#"INSERT INTO corpora (id, app_name, name, description, config, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, now(), now())
               RETURNING id, app_name, name, description, config, created_at, updated_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(app_name)
        .bind(name)
        .bind(description)
        .bind(config)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_corpus(&self, app_name: &str, corpus_id: Uuid) -> DomainResult<Option<Corpus>> {
        let row = sqlx::query_as::<_, Corpus>(
            "SELECT id, app_name, name, description, config, created_at, updated_at FROM corpora WHERE id = $1 AND app_name = $2",
        )
        .bind(corpus_id)
        .bind(app_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_corpora(&self, app_name: &str) -> DomainResult<Vec<Corpus>> {
        let rows = sqlx::query_as::<_, Corpus>(
            "SELECT id, app_name, name, description, config, created_at, updated_at FROM corpora WHERE app_name = $1 ORDER BY created_at DESC",
        )
        .bind(app_name)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn update_corpus(
        &self,
        app_name: &str,
        corpus_id: Uuid,
        name: &str,
        description: Option<&str>,
        config: serde_json::Value,
    ) -> DomainResult<Corpus> {
        let row = sqlx::query_as::<_, Corpus>(
            r#"UPDATE corpora SET name = $1, description = $2, config = $3, updated_at = now()
               WHERE id = $4 AND app_name = $5
               RETURNING id, app_name, name, description, config, created_at, updated_at"#,
        )
        .bind(name)
        .bind(description)
        .bind(config)
        .bind(corpus_id)
        .bind(app_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Paginated listing with an optional `source_uri` filter (spec §4.5
    /// `list_knowledge(corpus_id, source_uri?, page, page_size)`). The filter
    /// is applied in SQL, before `LIMIT`/`OFFSET`, so pagination stays correct.
    pub async fn list_knowledge(
        &self,
        app_name: &str,
        corpus_id: Uuid,
        source_uri: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> DomainResult<Vec<Knowledge>> {
        let rows = sqlx::query_as::<_, Knowledge>(
            r#"SELECT id, corpus_id, app_name, content, embedding, source_uri, chunk_index, metadata, created_at, updated_at
               FROM knowledge
               WHERE app_name = $1 AND corpus_id = $2 AND ($3::text IS NULL OR source_uri = $3)
               ORDER BY source_uri, chunk_index LIMIT $4 OFFSET $5"#,
        )
        .bind(app_name)
        .bind(corpus_id)
        .bind(source_uri)
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn delete_corpus(&self, app_name: &str, corpus_id: Uuid) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM corpora WHERE id = $1 AND app_name = $2")
            .bind(corpus_id)
            .bind(app_name)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(format!("corpus {corpus_id}")));
        }
        Ok(())
    }

    /// Deletes prior chunks for a source before re-ingesting it (spec §4.5 "delete" stage).
    pub async fn delete_by_source(&self, app_name: &str, corpus_id: Uuid, source_uri: &str) -> DomainResult<u64> {
        let result = sqlx::query("DELETE FROM knowledge WHERE app_name = $1 AND corpus_id = $2 AND source_uri = $3")
            .bind(app_name)
            .bind(corpus_id)
            .bind(source_uri)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn insert_chunks(&self, chunks: Vec<NewKnowledgeChunk>) -> DomainResult<Vec<Knowledge>> {
        let mut tx = self.pool.begin().await?;
        let mut rows = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let embedding = chunk.embedding.map(Vector::from);
            let row = sqlx::query_as::<_, Knowledge>(
                r#"
                INSERT INTO knowledge (id, corpus_id, app_name, content, embedding, source_uri, chunk_index, metadata, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now(), now())
                RETURNING id, corpus_id, app_name, content, embedding, source_uri, chunk_index, metadata, created_at, updated_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(chunk.corpus_id)
            .bind(&chunk.app_name)
            .bind(&chunk.content)
            .bind(embedding)
            .bind(&chunk.source_uri)
            .bind(chunk.chunk_index)
            .bind(&chunk.metadata)
            .fetch_one(&mut *tx)
            .await?;
            rows.push(row);
        }
        tx.commit().await?;
        Ok(rows)
    }

    /// Returns the existing document when `(corpus_id, file_hash)` already
    /// exists (spec §4.5 "Deduplication on upload"); else registers a new one.
    pub async fn register_document(
        &self,
        app_name: &str,
        corpus_id: Uuid,
        original_filename: &str,
        gcs_uri: &str,
        content_type: Option<&str>,
        raw_bytes: &[u8],
    ) -> DomainResult<(KnowledgeDocument, bool)> {
        let file_hash = sha256_hash_bytes(raw_bytes);

        if let Some(existing) = sqlx::query_as::<_, KnowledgeDocument>(
            r#"SELECT id, corpus_id, app_name, file_hash, original_filename, gcs_uri, content_type, file_size,
                      status, metadata, created_at, updated_at
               FROM knowledge_documents WHERE corpus_id = $1 AND file_hash = $2"#,
        )
        .bind(corpus_id)
        .bind(&file_hash)
        .fetch_optional(&self.pool)
        .await?
        {
            return Ok((existing, false));
        }

        let row = sqlx::query_as::<_, KnowledgeDocument>(
            r#"
            INSERT INTO knowledge_documents
                (id, corpus_id, app_name, file_hash, original_filename, gcs_uri, content_type, file_size,
                 status, metadata, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'active', '{}'::jsonb, now(), now())
            RETURNING id, corpus_id, app_name, file_hash, original_filename, gcs_uri, content_type, file_size,
                      status, metadata, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(corpus_id)
        .bind(app_name)
        .bind(&file_hash)
        .bind(original_filename)
        .bind(gcs_uri)
        .bind(content_type)
        .bind(raw_bytes.len() as i64)
        .fetch_one(&self.pool)
        .await?;

        Ok((row, true))
    }
}

#[derive(Debug, Clone)]
pub struct NewKnowledgeChunk {
    pub corpus_id: Uuid,
    pub app_name: String,
    pub content: String,
    pub embedding: Option<Vec<f32>>,
    pub source_uri: Option<String>,
    pub chunk_index: i64,
    pub metadata: serde_json::Value,
}

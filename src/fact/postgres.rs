// src/fact/postgres.rs
// Postgres-backed FactStore. Grounded on original_source/.../fact_service.py
// upsert-by-key semantics (spec §4.3).

use async_trait::async_trait;
use chrono::Utc;
use pgvector::Vector;
use sqlx::PgPool;
use uuid::Uuid;

use super::{FactStore, UpsertFact};
use crate::error::DomainResult;
use crate::models::Fact;
use crate::utils::escape_like_pattern;

pub struct PostgresFactStore {
    pool: PgPool,
}

impl PostgresFactStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FactStore for PostgresFactStore {
    async fn upsert_fact(&self, fact: UpsertFact) -> DomainResult<Fact> {
        let embedding = fact.embedding.map(Vector::from);
        let now = Utc::now();

        // `valid_from` is set only on insert; an existing row keeps its
        // original `valid_from` (spec §4.3: overwrite value/confidence/
        // embedding/valid_until on conflict, nothing else).
        let row = sqlx::query_as::<_, Fact>(
            r#"
            INSERT INTO facts
                (id, thread_id, user_id, app_name, fact_type, key, value, embedding, confidence,
                 valid_from, valid_until, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $10)
            ON CONFLICT (user_id, app_name, fact_type, key) DO UPDATE SET
                value = EXCLUDED.value,
                confidence = EXCLUDED.confidence,
                embedding = EXCLUDED.embedding,
                valid_until = EXCLUDED.valid_until,
                thread_id = EXCLUDED.thread_id
            RETURNING id, thread_id, user_id, app_name, fact_type, key, value, embedding, confidence,
                      valid_from, valid_until, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(fact.thread_id)
        .bind(&fact.user_id)
        .bind(&fact.app_name)
        .bind(&fact.fact_type)
        .bind(&fact.key)
        .bind(&fact.value)
        .bind(embedding)
        .bind(fact.confidence)
        .bind(now)
        .bind(fact.valid_until)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get_fact(&self, app_name: &str, user_id: &str, fact_type: &str, key: &str) -> DomainResult<Option<Fact>> {
        let row = sqlx::query_as::<_, Fact>(
            r#"SELECT id, thread_id, user_id, app_name, fact_type, key, value, embedding, confidence,
                      valid_from, valid_until, created_at
               FROM facts
               WHERE app_name = $1 AND user_id = $2 AND fact_type = $3 AND key = $4
                 AND (valid_until IS NULL OR valid_until >= now())"#,
        )
        .bind(app_name)
        .bind(user_id)
        .bind(fact_type)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_facts(&self, app_name: &str, user_id: &str) -> DomainResult<Vec<Fact>> {
        let rows = sqlx::query_as::<_, Fact>(
            r#"SELECT id, thread_id, user_id, app_name, fact_type, key, value, embedding, confidence,
                      valid_from, valid_until, created_at
               FROM facts
               WHERE app_name = $1 AND user_id = $2 AND (valid_until IS NULL OR valid_until >= now())
               ORDER BY created_at DESC"#,
        )
        .bind(app_name)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn search_facts(
        &self,
        app_name: &str,
        user_id: &str,
        query: &str,
        query_embedding: Option<Vec<f32>>,
        limit: usize,
    ) -> DomainResult<Vec<Fact>> {
        let rows = if let Some(embedding) = query_embedding {
            let vector = Vector::from(embedding);
            sqlx::query_as::<_, Fact>(
                r#"SELECT id, thread_id, user_id, app_name, fact_type, key, value, embedding, confidence,
                          valid_from, valid_until, created_at
                   FROM facts
                   WHERE app_name = $1 AND user_id = $2 AND embedding IS NOT NULL
                     AND (valid_until IS NULL OR valid_until >= now())
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
            let pattern = format!("%{}%", escape_like_pattern(query));
            sqlx::query_as::<_, Fact>(
                r#"SELECT id, thread_id, user_id, app_name, fact_type, key, value, embedding, confidence,
                          valid_from, valid_until, created_at
                   FROM facts
                   WHERE app_name = $1 AND user_id = $2 AND key ILIKE $3
                     AND (valid_until IS NULL OR valid_until >= now())
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
        Ok(rows)
    }

    async fn delete_fact(&self, app_name: &str, user_id: &str, fact_type: &str, key: &str) -> DomainResult<()> {
        sqlx::query("DELETE FROM facts WHERE app_name = $1 AND user_id = $2 AND fact_type = $3 AND key = $4")
            .bind(app_name)
            .bind(user_id)
            .bind(fact_type)
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

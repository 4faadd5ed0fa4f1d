// src/session/postgres.rs
// Postgres-backed SessionStore (spec §4.1). Grounded on
// original_source/.../session_service.py's append_event protocol: per-thread
// row lock, next sequence_num inside the transaction, routed state-delta
// application, conditional title generation scheduled out of transaction.

use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::{PgPool, Row};
use std::sync::Arc;
use uuid::Uuid;

use super::{parse_session_id, state_delta, NewEvent, SessionStore, TempCache, TitleSummarizer};
use crate::error::{DomainError, DomainResult};
use crate::models::state::shallow_merge;
use crate::models::{Event, Thread};

pub struct PostgresSessionStore {
    pool: PgPool,
    temp_cache: Arc<TempCache>,
    title_summarizer: Arc<dyn TitleSummarizer>,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool, temp_cache: Arc<TempCache>, title_summarizer: Arc<dyn TitleSummarizer>) -> Self {
        Self {
            pool,
            temp_cache,
            title_summarizer,
        }
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn create_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: Option<&str>,
        initial_state: Option<Value>,
    ) -> DomainResult<Thread> {
        let id = match session_id {
            Some(raw) => parse_session_id(raw)?,
            None => Uuid::new_v4(),
        };
        let state = initial_state.unwrap_or_else(|| json!({}));

        let thread = sqlx::query_as::<_, Thread>(
            r#"
            INSERT INTO threads (id, app_name, user_id, state, metadata, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, '{}'::jsonb, 1, now(), now())
            RETURNING id, app_name, user_id, state, metadata, version, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(app_name)
        .bind(user_id)
        .bind(state)
        .fetch_one(&self.pool)
        .await?;

        Ok(thread)
    }

    async fn get_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
        recent_n: Option<usize>,
    ) -> DomainResult<Option<(Thread, Vec<Event>)>> {
        let id = parse_session_id(session_id)?;

        let thread = sqlx::query_as::<_, Thread>(
            r#"SELECT id, app_name, user_id, state, metadata, version, created_at, updated_at
               FROM threads WHERE id = $1 AND app_name = $2 AND user_id = $3"#,
        )
        .bind(id)
        .bind(app_name)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(thread) = thread else {
            return Ok(None);
        };

        let events = if let Some(n) = recent_n {
            let mut rows = sqlx::query_as::<_, Event>(
                r#"SELECT id, thread_id, invocation_id, author, event_type, content, actions, sequence_num, created_at
                   FROM events WHERE thread_id = $1 ORDER BY sequence_num DESC LIMIT $2"#,
            )
            .bind(id)
            .bind(n as i64)
            .fetch_all(&self.pool)
            .await?;
            rows.reverse();
            rows
        } else {
            sqlx::query_as::<_, Event>(
                r#"SELECT id, thread_id, invocation_id, author, event_type, content, actions, sequence_num, created_at
                   FROM events WHERE thread_id = $1 ORDER BY sequence_num ASC"#,
            )
            .bind(id)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(Some((thread, events)))
    }

    async fn list_sessions(&self, app_name: &str, user_id: &str) -> DomainResult<Vec<Thread>> {
        let threads = sqlx::query_as::<_, Thread>(
            r#"SELECT id, app_name, user_id, state, metadata, version, created_at, updated_at
               FROM threads WHERE app_name = $1 AND user_id = $2 ORDER BY updated_at DESC"#,
        )
        .bind(app_name)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(threads)
    }

    async fn delete_session(&self, app_name: &str, user_id: &str, session_id: &str) -> DomainResult<()> {
        let id = parse_session_id(session_id)?;
        let result = sqlx::query("DELETE FROM threads WHERE id = $1 AND app_name = $2 AND user_id = $3")
            .bind(id)
            .bind(app_name)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(format!("session {session_id}")));
        }
        self.temp_cache.evict(session_id);
        Ok(())
    }

    async fn append_event(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
        new_event: NewEvent,
    ) -> DomainResult<Event> {
        let thread_id = parse_session_id(session_id)?;
        let content_value =
            serde_json::to_value(&new_event.content).map_err(|e| DomainError::InvalidArgument(e.to_string()))?;
        let actions_value = json!({ "state_delta": new_event.state_delta });

        let mut tx = self.pool.begin().await?;

        // Row-level lock on the thread serializes concurrent append_event calls
        // on the same thread (spec §4.1 "Ordering & concurrency").
        let thread_row = sqlx::query(
            r#"SELECT state, metadata FROM threads WHERE id = $1 AND app_name = $2 AND user_id = $3 FOR UPDATE"#,
        )
        .bind(thread_id)
        .bind(app_name)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(thread_row) = thread_row else {
            return Err(DomainError::NotFound(format!("session {session_id}")));
        };
        let existing_state: Value = thread_row.try_get("state")?;
        let existing_metadata: Value = thread_row.try_get("metadata")?;

        let next_seq: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(sequence_num), 0) + 1 FROM events WHERE thread_id = $1",
        )
        .bind(thread_id)
        .fetch_one(&mut *tx)
        .await?;

        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (id, thread_id, invocation_id, author, event_type, content, actions, sequence_num, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now())
            RETURNING id, thread_id, invocation_id, author, event_type, content, actions, sequence_num, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(thread_id)
        .bind(&new_event.invocation_id)
        .bind(new_event.author.as_str())
        .bind(&new_event.event_type)
        .bind(&content_value)
        .bind(&actions_value)
        .bind(next_seq)
        .fetch_one(&mut *tx)
        .await?;

        let routed = state_delta::route(&new_event.state_delta);

        let new_thread_state = shallow_merge(&existing_state, &routed.thread);
        sqlx::query("UPDATE threads SET state = $1, updated_at = now() WHERE id = $2")
            .bind(&new_thread_state)
            .bind(thread_id)
            .execute(&mut *tx)
            .await?;

        if !routed.user.is_empty() {
            upsert_user_state(&mut tx, app_name, user_id, &routed.user).await?;
        }
        if !routed.app.is_empty() {
            upsert_app_state(&mut tx, app_name, &routed.app).await?;
        }

        tx.commit().await?;

        self.temp_cache.apply(session_id, &routed.temp);

        let existing_title = existing_metadata.get("title").and_then(|v| v.as_str());
        if event.is_non_tool_with_content() {
            let non_tool_count: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM events WHERE thread_id = $1 AND author <> 'tool'",
            )
            .bind(thread_id)
            .fetch_one(&self.pool)
            .await?;

            if super::title::should_generate_title(existing_title, non_tool_count as usize) {
                self.try_generate_title(app_name, user_id, thread_id).await;
            }
        }

        Ok(event)
    }

    async fn update_session_title(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
        title: &str,
    ) -> DomainResult<()> {
        let id = parse_session_id(session_id)?;
        let result = sqlx::query(
            r#"UPDATE threads SET metadata = jsonb_set(metadata, '{title}', to_jsonb($1::text), true), updated_at = now()
               WHERE id = $2 AND app_name = $3 AND user_id = $4"#,
        )
        .bind(title)
        .bind(id)
        .bind(app_name)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(format!("session {session_id}")));
        }
        Ok(())
    }
}

impl PostgresSessionStore {
    /// Title generation failure is logged and never propagated — it must not
    /// affect the append that triggered it (spec §4.1 step 4).
    async fn try_generate_title(&self, app_name: &str, user_id: &str, thread_id: Uuid) {
        let recent = sqlx::query_as::<_, Event>(
            r#"SELECT id, thread_id, invocation_id, author, event_type, content, actions, sequence_num, created_at
               FROM events WHERE thread_id = $1 ORDER BY sequence_num DESC LIMIT 5"#,
        )
        .bind(thread_id)
        .fetch_all(&self.pool)
        .await;

        let mut recent = match recent {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(error = %e, %thread_id, "failed to load recent events for title generation");
                return;
            }
        };
        recent.reverse();

        match self.title_summarizer.summarize(&recent).await {
            Ok(title) if !title.is_empty() => {
                if let Err(e) = self
                    .update_session_title(app_name, user_id, &thread_id.to_string(), &title)
                    .await
                {
                    tracing::warn!(error = %e, %thread_id, "failed to persist generated title");
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, %thread_id, "title generation failed");
            }
        }
    }
}

async fn upsert_user_state(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    app_name: &str,
    user_id: &str,
    delta: &std::collections::HashMap<String, Value>,
) -> DomainResult<()> {
    let existing: Option<Value> =
        sqlx::query_scalar("SELECT state FROM user_states WHERE user_id = $1 AND app_name = $2")
            .bind(user_id)
            .bind(app_name)
            .fetch_optional(&mut **tx)
            .await?;

    let merged = shallow_merge(&existing.unwrap_or_else(|| json!({})), delta);

    sqlx::query(
        r#"INSERT INTO user_states (user_id, app_name, state, updated_at) VALUES ($1, $2, $3, now())
           ON CONFLICT (user_id, app_name) DO UPDATE SET state = EXCLUDED.state, updated_at = now()"#,
    )
    .bind(user_id)
    .bind(app_name)
    .bind(&merged)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn upsert_app_state(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    app_name: &str,
    delta: &std::collections::HashMap<String, Value>,
) -> DomainResult<()> {
    let existing: Option<Value> = sqlx::query_scalar("SELECT state FROM app_states WHERE app_name = $1")
        .bind(app_name)
        .fetch_optional(&mut **tx)
        .await?;

    let merged = shallow_merge(&existing.unwrap_or_else(|| json!({})), delta);

    sqlx::query(
        r#"INSERT INTO app_states (app_name, state, updated_at) VALUES ($1, $2, now())
           ON CONFLICT (app_name) DO UPDATE SET state = EXCLUDED.state, updated_at = now()"#,
    )
    .bind(app_name)
    .bind(&merged)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

// src/governance/mod.rs
// Governance Service (spec §4.4): audit decisions with idempotency, optimistic
// version control, and cascading delete/anonymize. Grounded on
// original_source/.../governance/memory.py's audit_memory protocol.

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::models::audit::{AuditRecord, Decision, MemoryAuditLog};

pub struct GovernanceService {
    pool: PgPool,
}

#[derive(Debug, Clone, Default)]
pub struct AuditRequest {
    pub decisions: HashMap<Uuid, String>,
    pub expected_versions: Option<HashMap<Uuid, i64>>,
    pub note: Option<String>,
    pub idempotency_key: Option<String>,
}

impl GovernanceService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn audit_memory(
        &self,
        app_name: &str,
        user_id: &str,
        request: AuditRequest,
    ) -> DomainResult<Vec<AuditRecord>> {
        // Step 1: validate every decision value up front.
        let mut decisions: HashMap<Uuid, Decision> = HashMap::with_capacity(request.decisions.len());
        for (memory_id, action) in &request.decisions {
            let decision = Decision::parse(action)
                .ok_or_else(|| DomainError::InvalidArgument(format!("invalid decision '{action}'")))?;
            decisions.insert(*memory_id, decision);
        }

        // Step 2: idempotency-key short-circuit (at-most-once semantics).
        if let Some(key) = &request.idempotency_key {
            let prior = sqlx::query_as::<_, MemoryAuditLog>(
                r#"SELECT id, app_name, user_id, memory_id, decision, note, idempotency_key, version, created_at
                   FROM memory_audit_log WHERE app_name = $1 AND user_id = $2 AND idempotency_key = $3"#,
            )
            .bind(app_name)
            .bind(user_id)
            .bind(key)
            .fetch_all(&self.pool)
            .await?;
            if !prior.is_empty() {
                return Ok(prior.into_iter().map(AuditRecord::from).collect());
            }
        }

        let mut tx = self.pool.begin().await?;
        let mut records = Vec::with_capacity(decisions.len());

        for (memory_id, decision) in decisions {
            let current_version: i64 = sqlx::query_scalar(
                "SELECT COALESCE(MAX(version), 0) FROM memory_audit_log WHERE app_name = $1 AND user_id = $2 AND memory_id = $3",
            )
            .bind(app_name)
            .bind(user_id)
            .bind(memory_id)
            .fetch_one(&mut *tx)
            .await?;

            if let Some(expected) = request.expected_versions.as_ref().and_then(|m| m.get(&memory_id)) {
                if *expected != current_version {
                    return Err(DomainError::VersionConflict {
                        expected: *expected,
                        actual: current_version,
                    });
                }
            }

            let thread_id: Option<Uuid> =
                sqlx::query_scalar("SELECT thread_id FROM memories WHERE id = $1 AND app_name = $2")
                    .bind(memory_id)
                    .bind(app_name)
                    .fetch_optional(&mut *tx)
                    .await?
                    .flatten();

            match decision {
                Decision::Retain => {}
                Decision::Delete => {
                    sqlx::query("DELETE FROM memories WHERE id = $1 AND app_name = $2")
                        .bind(memory_id)
                        .bind(app_name)
                        .execute(&mut *tx)
                        .await?;
                    if let Some(thread_id) = thread_id {
                        sqlx::query(
                            "DELETE FROM facts WHERE user_id = $1 AND app_name = $2 AND thread_id = $3",
                        )
                        .bind(user_id)
                        .bind(app_name)
                        .bind(thread_id)
                        .execute(&mut *tx)
                        .await?;
                    }
                }
                Decision::Anonymize => {
                    sqlx::query(
                        "UPDATE memories SET content = '[ANONYMIZED]', metadata = '{}'::jsonb, embedding = NULL, updated_at = now() \
                         WHERE id = $1 AND app_name = $2",
                    )
                    .bind(memory_id)
                    .bind(app_name)
                    .execute(&mut *tx)
                    .await?;
                    if let Some(thread_id) = thread_id {
                        sqlx::query(
                            "UPDATE facts SET value = '{\"anonymized\": true}'::jsonb, embedding = NULL \
                             WHERE user_id = $1 AND app_name = $2 AND thread_id = $3",
                        )
                        .bind(user_id)
                        .bind(app_name)
                        .bind(thread_id)
                        .execute(&mut *tx)
                        .await?;
                    }
                }
            }

            let new_version = current_version + 1;
            let log = sqlx::query_as::<_, MemoryAuditLog>(
                r#"
                INSERT INTO memory_audit_log
                    (id, app_name, user_id, memory_id, decision, note, idempotency_key, version, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now())
                RETURNING id, app_name, user_id, memory_id, decision, note, idempotency_key, version, created_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(app_name)
            .bind(user_id)
            .bind(memory_id)
            .bind(decision.as_str())
            .bind(&request.note)
            .bind(&request.idempotency_key)
            .bind(new_version)
            .fetch_one(&mut *tx)
            .await?;

            records.push(AuditRecord::from(log));
        }

        tx.commit().await?;
        Ok(records)
    }

    /// Supplemental read operation (spec §4.4 supplement, grounded on
    /// `original_source/.../governance/memory.py`'s `get_audit_history`).
    pub async fn get_audit_history(
        &self,
        app_name: &str,
        user_id: &str,
        limit: usize,
    ) -> DomainResult<Vec<AuditRecord>> {
        let rows = sqlx::query_as::<_, MemoryAuditLog>(
            r#"SELECT id, app_name, user_id, memory_id, decision, note, idempotency_key, version, created_at
               FROM memory_audit_log WHERE app_name = $1 AND user_id = $2
               ORDER BY created_at DESC LIMIT $3"#,
        )
        .bind(app_name)
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(AuditRecord::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_parse_rejects_unknown_values() {
        assert!(Decision::parse("destroy").is_none());
        assert_eq!(Decision::parse("retain"), Some(Decision::Retain));
    }
}

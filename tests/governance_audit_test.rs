// Exercises GovernanceService::audit_memory's optimistic version control and
// idempotency-key short-circuit against a real schema.

use std::collections::HashMap;

use negentropy_engine::governance::{AuditRequest, GovernanceService};
use sqlx::PgPool;
use uuid::Uuid;

async fn insert_memory(pool: &PgPool, app_name: &str, user_id: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"INSERT INTO memories (id, user_id, app_name, memory_type, content)
           VALUES ($1, $2, $3, 'fact', 'remember me')"#,
    )
    .bind(id)
    .bind(user_id)
    .bind(app_name)
    .execute(pool)
    .await
    .expect("insert memory");
    id
}

#[sqlx::test]
async fn stale_expected_version_is_rejected(pool: PgPool) -> sqlx::Result<()> {
    let memory_id = insert_memory(&pool, "acme", "user-1").await;
    let governance = GovernanceService::new(pool.clone());

    let mut expected_versions = HashMap::new();
    expected_versions.insert(memory_id, 5);

    let mut decisions = HashMap::new();
    decisions.insert(memory_id, "retain".to_string());

    let result = governance
        .audit_memory(
            "acme",
            "user-1",
            AuditRequest {
                decisions,
                expected_versions: Some(expected_versions),
                note: None,
                idempotency_key: None,
            },
        )
        .await;

    assert!(result.is_err());
    Ok(())
}

#[sqlx::test]
async fn idempotency_key_short_circuits_repeated_audits(pool: PgPool) -> sqlx::Result<()> {
    let memory_id = insert_memory(&pool, "acme", "user-1").await;
    let governance = GovernanceService::new(pool.clone());

    let mut decisions = HashMap::new();
    decisions.insert(memory_id, "delete".to_string());

    let request = || AuditRequest {
        decisions: decisions.clone(),
        expected_versions: None,
        note: None,
        idempotency_key: Some("audit-once".to_string()),
    };

    let first = governance.audit_memory("acme", "user-1", request()).await.expect("first audit");
    let second = governance.audit_memory("acme", "user-1", request()).await.expect("second audit");

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_eq!(first[0].version, second[0].version, "replayed audit must not bump the version again");
    assert_eq!(first[0].version, 1);
    Ok(())
}

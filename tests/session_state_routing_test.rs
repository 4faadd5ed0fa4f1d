// Exercises prefix-scoped state-delta routing end to end: a single
// append_event call should split its state_delta across Thread.state,
// UserState, AppState, and the in-process temp cache.

use std::collections::HashMap;
use std::sync::Arc;

use negentropy_engine::session::{
    FallbackTitleSummarizer, NewEvent, PostgresSessionStore, SessionStore, TempCache,
};
use negentropy_engine::models::{EventAuthor, EventContent};
use serde_json::json;
use sqlx::PgPool;

fn store(pool: PgPool) -> PostgresSessionStore {
    PostgresSessionStore::new(pool, Arc::new(TempCache::new()), Arc::new(FallbackTitleSummarizer))
}

#[sqlx::test]
async fn state_delta_routes_by_prefix(pool: PgPool) -> sqlx::Result<()> {
    let store = store(pool);
    let thread = store
        .create_session("acme", "user-1", None, None)
        .await
        .expect("create session");

    let mut delta = HashMap::new();
    delta.insert("topic".to_string(), json!("rust"));
    delta.insert("user:locale".to_string(), json!("en-US"));
    delta.insert("app:feature_flag".to_string(), json!(true));
    delta.insert("temp:draft".to_string(), json!("scratch"));

    store
        .append_event(
            "acme",
            "user-1",
            &thread.id.to_string(),
            NewEvent {
                invocation_id: None,
                author: EventAuthor::User,
                event_type: "message".to_string(),
                content: EventContent::Text("hello".to_string()),
                state_delta: delta,
            },
        )
        .await
        .expect("append event");

    let (reloaded, events) = store
        .get_session("acme", "user-1", &thread.id.to_string(), None)
        .await
        .expect("get session")
        .expect("session exists");

    assert_eq!(events.len(), 1);
    assert_eq!(reloaded.state.get("topic"), Some(&json!("rust")));
    assert!(reloaded.state.get("locale").is_none(), "user-prefixed key must not land in thread state");
    assert!(reloaded.state.get("feature_flag").is_none(), "app-prefixed key must not land in thread state");
    assert!(reloaded.state.get("draft").is_none(), "temp-prefixed key must never persist");

    Ok(())
}

#[sqlx::test]
async fn append_event_rejects_unknown_session(pool: PgPool) -> sqlx::Result<()> {
    let store = store(pool);
    let result = store
        .append_event(
            "acme",
            "user-1",
            &uuid::Uuid::new_v4().to_string(),
            NewEvent {
                invocation_id: None,
                author: EventAuthor::Agent,
                event_type: "message".to_string(),
                content: EventContent::Text("hi".to_string()),
                state_delta: HashMap::new(),
            },
        )
        .await;

    assert!(result.is_err());
    Ok(())
}

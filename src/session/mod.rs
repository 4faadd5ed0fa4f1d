// src/session/mod.rs
// Session Store — durable conversation persistence with prefix-scoped state
// routing, ordered event append, and optimistic versioning (spec §4.1).

pub mod postgres;
pub mod state_delta;
pub mod temp_cache;
pub mod title;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::error::DomainResult;
use crate::models::{Event, EventAuthor, Thread};

pub use postgres::PostgresSessionStore;
pub use temp_cache::TempCache;
pub use title::{FallbackTitleSummarizer, TitleSummarizer};

/// A newly appended event's raw inputs, supplied by the agent framework.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub invocation_id: Option<String>,
    pub author: EventAuthor,
    pub event_type: String,
    pub content: crate::models::EventContent,
    /// Raw `actions.state_delta` map, prefix-routed on append.
    pub state_delta: std::collections::HashMap<String, Value>,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: Option<&str>,
        initial_state: Option<Value>,
    ) -> DomainResult<Thread>;

    /// `recent_n`: if set, only the most recent N events are returned with
    /// the thread (replay order, ascending `sequence_num`).
    async fn get_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
        recent_n: Option<usize>,
    ) -> DomainResult<Option<(Thread, Vec<Event>)>>;

    async fn list_sessions(&self, app_name: &str, user_id: &str) -> DomainResult<Vec<Thread>>;

    async fn delete_session(&self, app_name: &str, user_id: &str, session_id: &str) -> DomainResult<()>;

    async fn append_event(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
        event: NewEvent,
    ) -> DomainResult<Event>;

    async fn update_session_title(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
        title: &str,
    ) -> DomainResult<()>;
}

/// Parses and validates a caller-supplied session id. Per spec §9, a failed
/// parse fails fast with `invalid-argument` rather than silently substituting
/// a freshly generated id (the source's `_ensure_uuid` behavior, rejected).
pub fn parse_session_id(raw: &str) -> DomainResult<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|e| crate::error::DomainError::InvalidArgument(format!("invalid session id '{raw}': {e}")))
}

// src/fact/mod.rs
// Fact Store (spec §4.3).

pub mod postgres;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::error::DomainResult;
use crate::models::Fact;

pub use postgres::PostgresFactStore;

#[derive(Debug, Clone)]
pub struct UpsertFact {
    pub thread_id: Option<Uuid>,
    pub user_id: String,
    pub app_name: String,
    pub fact_type: String,
    pub key: String,
    pub value: Value,
    pub embedding: Option<Vec<f32>>,
    pub confidence: f64,
    pub valid_until: Option<chrono::DateTime<chrono::Utc>>,
}

/// Embedding input text for a fact (spec §4.3: `"{key}: {stringified value}"`).
pub fn embedding_input(key: &str, value: &Value) -> String {
    let stringified = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    format!("{key}: {stringified}")
}

#[async_trait]
pub trait FactStore: Send + Sync {
    async fn upsert_fact(&self, fact: UpsertFact) -> DomainResult<Fact>;

    async fn get_fact(&self, app_name: &str, user_id: &str, fact_type: &str, key: &str) -> DomainResult<Option<Fact>>;

    async fn list_facts(&self, app_name: &str, user_id: &str) -> DomainResult<Vec<Fact>>;

    async fn search_facts(
        &self,
        app_name: &str,
        user_id: &str,
        query: &str,
        query_embedding: Option<Vec<f32>>,
        limit: usize,
    ) -> DomainResult<Vec<Fact>>;

    async fn delete_fact(&self, app_name: &str, user_id: &str, fact_type: &str, key: &str) -> DomainResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn embedding_input_uses_raw_string_value_without_quotes() {
        assert_eq!(embedding_input("favorite_color", &json!("blue")), "favorite_color: blue");
    }

    #[test]
    fn embedding_input_stringifies_non_string_value() {
        assert_eq!(embedding_input("age", &json!(30)), "age: 30");
        assert_eq!(embedding_input("tags", &json!(["a", "b"])), "tags: [\"a\",\"b\"]");
    }
}

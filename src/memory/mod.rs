// src/memory/mod.rs
// Memory Store & Consolidation (spec §4.2).

pub mod consolidation;
pub mod postgres;
pub mod retention;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::error::DomainResult;
use crate::models::memory::RankedMemory;
use crate::models::Memory;

pub use postgres::PostgresMemoryStore;

#[derive(Debug, Clone)]
pub struct NewMemory {
    pub thread_id: Option<Uuid>,
    pub user_id: String,
    pub app_name: String,
    pub memory_type: String,
    pub content: String,
    pub embedding: Option<Vec<f32>>,
    pub metadata: Value,
}

#[async_trait]
pub trait MemoryStore: Send + Sync {
    async fn add_memory(&self, memory: NewMemory) -> DomainResult<Memory>;

    async fn get_memory(&self, app_name: &str, memory_id: Uuid) -> DomainResult<Option<Memory>>;

    async fn search_memory(
        &self,
        app_name: &str,
        user_id: &str,
        query: &str,
        query_embedding: Option<Vec<f32>>,
        limit: usize,
    ) -> DomainResult<Vec<RankedMemory>>;

    async fn list_memories(&self, app_name: &str, user_id: &str) -> DomainResult<Vec<Memory>>;

    async fn delete_memory(&self, app_name: &str, memory_id: Uuid) -> DomainResult<()>;

    async fn record_access(&self, app_name: &str, memory_id: Uuid) -> DomainResult<()>;
}

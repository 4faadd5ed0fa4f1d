// src/knowledge/retrieval/mod.rs
// Retrieval modes and reranker chain (spec §4.5).

pub mod hybrid;
pub mod keyword;
pub mod reranker;
pub mod rrf;
pub mod semantic;

use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::knowledge::RetrievalConfig;
use crate::error::DomainResult;

pub use reranker::{ApiReranker, CompositeReranker, LocalReranker, NoopReranker, RerankOptions, Reranker};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub knowledge_id: Uuid,
    pub content: String,
    pub source_uri: Option<String>,
    pub metadata: Value,
    pub semantic_score: Option<f64>,
    pub keyword_score: Option<f64>,
    pub combined_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalMode {
    Semantic,
    Keyword,
    Hybrid,
    Rrf,
}

impl RetrievalMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "semantic" => Some(Self::Semantic),
            "keyword" => Some(Self::Keyword),
            "hybrid" => Some(Self::Hybrid),
            "rrf" => Some(Self::Rrf),
            _ => None,
        }
    }
}

pub struct RetrievalEngine {
    pool: PgPool,
    config: RetrievalConfig,
}

impl RetrievalEngine {
    pub fn new(pool: PgPool, config: RetrievalConfig) -> Self {
        Self { pool, config }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub async fn search(
        &self,
        app_name: &str,
        corpus_id: Uuid,
        query: &str,
        query_embedding: Option<Vec<f32>>,
        mode: RetrievalMode,
        metadata_filter: Option<Value>,
        limit: usize,
    ) -> DomainResult<Vec<ScoredChunk>> {
        match mode {
            RetrievalMode::Semantic => {
                semantic::search(&self.pool, app_name, corpus_id, query_embedding, metadata_filter.as_ref(), limit)
                    .await
            }
            RetrievalMode::Keyword => {
                keyword::search(&self.pool, app_name, corpus_id, query, metadata_filter.as_ref(), limit).await
            }
            RetrievalMode::Hybrid => {
                let search_limit = limit.max(self.config.default_limit);
                let (semantic_results, keyword_results) = tokio::try_join!(
                    semantic::search(&self.pool, app_name, corpus_id, query_embedding, metadata_filter.as_ref(), search_limit),
                    keyword::search(&self.pool, app_name, corpus_id, query, metadata_filter.as_ref(), search_limit),
                )?;
                Ok(hybrid::combine(
                    semantic_results,
                    keyword_results,
                    self.config.semantic_weight,
                    self.config.keyword_weight,
                    limit,
                ))
            }
            RetrievalMode::Rrf => {
                let search_limit = limit.max(self.config.default_limit);
                let (semantic_results, keyword_results) = tokio::try_join!(
                    semantic::search(&self.pool, app_name, corpus_id, query_embedding, metadata_filter.as_ref(), search_limit),
                    keyword::search(&self.pool, app_name, corpus_id, query, metadata_filter.as_ref(), search_limit),
                )?;
                Ok(rrf::combine(semantic_results, keyword_results, self.config.rrf_k, limit))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_known_modes_case_insensitively() {
        assert_eq!(RetrievalMode::parse("Hybrid"), Some(RetrievalMode::Hybrid));
        assert_eq!(RetrievalMode::parse("rrf"), Some(RetrievalMode::Rrf));
        assert_eq!(RetrievalMode::parse("bogus"), None);
    }
}

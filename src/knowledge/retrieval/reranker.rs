// src/knowledge/retrieval/reranker.rs
// Reranker chain (spec §4.5): Noop / Local / API / Composite.

use async_trait::async_trait;
use std::sync::Arc;

use super::ScoredChunk;
use crate::providers::RerankProvider;

#[derive(Debug, Clone, Default)]
pub struct RerankOptions {
    pub top_n: Option<usize>,
    pub score_threshold: Option<f64>,
    pub normalize: bool,
}

#[async_trait]
pub trait Reranker: Send + Sync {
    async fn rerank(&self, query: &str, candidates: Vec<ScoredChunk>, options: &RerankOptions) -> Vec<ScoredChunk>;
}

/// Preserves the incoming order untouched.
pub struct NoopReranker;

#[async_trait]
impl Reranker for NoopReranker {
    async fn rerank(&self, _query: &str, candidates: Vec<ScoredChunk>, _options: &RerankOptions) -> Vec<ScoredChunk> {
        candidates
    }
}

/// Cross-encoder reranker: rescores candidate-query pairs in a single batch
/// call, overwriting `semantic_score` and `combined_score` with the rescore.
pub struct LocalReranker {
    provider: Arc<dyn RerankProvider>,
    model: String,
}

impl LocalReranker {
    pub fn new(provider: Arc<dyn RerankProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Reranker for LocalReranker {
    async fn rerank(&self, query: &str, candidates: Vec<ScoredChunk>, options: &RerankOptions) -> Vec<ScoredChunk> {
        rescore(self.provider.as_ref(), &self.model, query, candidates, options).await
    }
}

/// HTTP-backed reranker: posts `{query, documents, top_n, model}` and
/// reorders by the returned `relevance_score`.
pub struct ApiReranker {
    provider: Arc<dyn RerankProvider>,
    model: String,
}

impl ApiReranker {
    pub fn new(provider: Arc<dyn RerankProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Reranker for ApiReranker {
    async fn rerank(&self, query: &str, candidates: Vec<ScoredChunk>, options: &RerankOptions) -> Vec<ScoredChunk> {
        rescore(self.provider.as_ref(), &self.model, query, candidates, options).await
    }
}

async fn rescore(
    provider: &dyn RerankProvider,
    model: &str,
    query: &str,
    candidates: Vec<ScoredChunk>,
    options: &RerankOptions,
) -> Vec<ScoredChunk> {
    if candidates.is_empty() {
        return candidates;
    }
    let documents: Vec<String> = candidates.iter().map(|c| c.content.clone()).collect();
    let top_n = options.top_n.unwrap_or(candidates.len());

    let rescored = match provider.rerank(query, &documents, top_n, model).await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(error = %e, "rerank call failed, falling back to original order");
            return candidates;
        }
    };

    let mut out: Vec<ScoredChunk> = rescored
        .into_iter()
        .filter_map(|candidate| {
            candidates.get(candidate.index).cloned().map(|mut chunk| {
                chunk.semantic_score = Some(candidate.relevance_score);
                chunk.combined_score = candidate.relevance_score;
                chunk
            })
        })
        .collect();

    if let Some(threshold) = options.score_threshold {
        out.retain(|c| c.combined_score >= threshold);
    }

    if options.normalize && !out.is_empty() {
        let min = out.iter().map(|c| c.combined_score).fold(f64::INFINITY, f64::min);
        let max = out.iter().map(|c| c.combined_score).fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;
        if range > 0.0 {
            for chunk in &mut out {
                chunk.combined_score = (chunk.combined_score - min) / range;
            }
        }
    }

    out.truncate(top_n);
    out
}

/// Tries `primary`, then `fallback`, then `final_fallback` (always Noop).
pub struct CompositeReranker {
    primary: Arc<dyn Reranker>,
    fallback: Arc<dyn Reranker>,
}

impl CompositeReranker {
    pub fn new(primary: Arc<dyn Reranker>, fallback: Arc<dyn Reranker>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl Reranker for CompositeReranker {
    async fn rerank(&self, query: &str, candidates: Vec<ScoredChunk>, options: &RerankOptions) -> Vec<ScoredChunk> {
        let attempt = self.primary.rerank(query, candidates.clone(), options).await;
        if !attempt.is_empty() || candidates.is_empty() {
            return attempt;
        }
        let attempt = self.fallback.rerank(query, candidates.clone(), options).await;
        if !attempt.is_empty() {
            return attempt;
        }
        NoopReranker.rerank(query, candidates, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn chunk() -> ScoredChunk {
        ScoredChunk {
            knowledge_id: Uuid::new_v4(),
            content: "x".to_string(),
            source_uri: None,
            metadata: json!({}),
            semantic_score: Some(0.1),
            keyword_score: None,
            combined_score: 0.1,
        }
    }

    #[tokio::test]
    async fn noop_reranker_preserves_order() {
        let candidates = vec![chunk(), chunk()];
        let original = candidates.clone();
        let reranked = NoopReranker.rerank("q", candidates, &RerankOptions::default()).await;
        assert_eq!(reranked, original);
    }
}

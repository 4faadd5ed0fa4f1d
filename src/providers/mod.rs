// src/providers/mod.rs
// External provider contracts (spec §6): embedding, LLM, and rerank are
// collaborators outside this repo's scope — only the async function contract
// is specified here.

pub mod cost;

use async_trait::async_trait;

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;
    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

#[derive(Debug, Clone)]
pub struct ChatChunk {
    pub delta: String,
    pub done: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Streaming chat completion; the returned chunks are sequential content
    /// deltas. Usage is surfaced once the stream completes for cost attribution.
    async fn complete(&self, model: &str, prompt: &str) -> anyhow::Result<(String, Usage)>;
}

#[derive(Debug, Clone)]
pub struct RerankCandidate {
    pub index: usize,
    pub relevance_score: f64,
}

#[async_trait]
pub trait RerankProvider: Send + Sync {
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
        top_n: usize,
        model: &str,
    ) -> anyhow::Result<Vec<RerankCandidate>>;
}

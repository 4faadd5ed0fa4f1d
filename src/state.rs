// src/state.rs
// Application state - composes the database pool and every service the HTTP
// boundary dispatches to (spec §4, §6).

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::artifact::ArtifactStore;
use crate::config::EngineConfig;
use crate::credential::CredentialStore;
use crate::fact::FactStore;
use crate::factories;
use crate::governance::GovernanceService;
use crate::knowledge::{IngestionPipeline, KnowledgeRepository, PipelineRepository};
use crate::knowledge::retrieval::RetrievalEngine;
use crate::memory::MemoryStore;
use crate::providers::EmbeddingProvider;
use crate::session::{FallbackTitleSummarizer, SessionStore, TempCache};
use crate::tracing_core::SpanExporter;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct ServerState {
    pub pool: PgPool,
    pub session_store: Arc<dyn SessionStore>,
    pub memory_store: Arc<dyn MemoryStore>,
    pub fact_store: Arc<dyn FactStore>,
    pub credential_store: Arc<dyn CredentialStore>,
    pub artifact_store: Arc<dyn ArtifactStore>,
    pub governance: Arc<GovernanceService>,
    pub knowledge_repo: Arc<KnowledgeRepository>,
    pub pipeline_repo: Arc<PipelineRepository>,
    pub ingestion: Arc<IngestionPipeline>,
    pub retrieval: Arc<RetrievalEngine>,
    pub span_exporter: Arc<SpanExporter>,
    pub embedder: Option<Arc<dyn EmbeddingProvider>>,
}

impl ServerState {
    /// Builds every service from a connected pool. The embedding provider is
    /// an external collaborator (spec §6) — absent here, retrieval falls
    /// back to keyword-only behavior and ingestion persists null embeddings.
    pub async fn new(config: &EngineConfig, pool: PgPool) -> anyhow::Result<Self> {
        let temp_cache = Arc::new(TempCache::new());
        let title_summarizer: Arc<dyn crate::session::TitleSummarizer> = Arc::new(FallbackTitleSummarizer);

        let session_store = factories::session_store(&pool, temp_cache, title_summarizer, None)?;
        let memory_store = factories::memory_store(&pool, None)?;
        let fact_store = factories::fact_store(&pool);
        let credential_store = factories::credential_store(&pool, None)?;
        let artifact_store = factories::artifact_store(None)?;

        let governance = Arc::new(GovernanceService::new(pool.clone()));
        let knowledge_repo = Arc::new(KnowledgeRepository::new(pool.clone()));
        let pipeline_repo = Arc::new(PipelineRepository::new(pool.clone()));

        let embedder: Option<Arc<dyn EmbeddingProvider>> = None;
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.rate_limit.embedding_timeout_secs))
            .build()?;

        let ingestion = Arc::new(IngestionPipeline::new(
            pool.clone(),
            embedder.clone(),
            http_client,
            config.chunking.clone(),
            config.rate_limit.clone(),
        ));
        let retrieval = Arc::new(RetrievalEngine::new(pool.clone(), config.retrieval.clone()));
        let span_exporter = SpanExporter::new(pool.clone(), crate::tracing_core::exporter::DEFAULT_QUEUE_CAPACITY);

        Ok(Self {
            pool,
            session_store,
            memory_store,
            fact_store,
            credential_store,
            artifact_store,
            governance,
            knowledge_repo,
            pipeline_repo,
            ingestion,
            retrieval,
            span_exporter,
            embedder,
        })
    }
}

// src/knowledge/mod.rs
// Knowledge Repository & Retrieval Engine (spec §4.5).

pub mod chunking;
pub mod extraction;
pub mod ingestion;
pub mod pipeline_repo;
pub mod repository;
pub mod retrieval;

pub use ingestion::{IngestSource, IngestionPipeline};
pub use pipeline_repo::{DashboardSummary, PipelineRepository, UpsertRun};
pub use repository::{KnowledgeRepository, NewKnowledgeChunk};

// src/config/knowledge.rs
// Chunking, retrieval and ingestion configuration (spec §4.5)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
    pub preserve_newlines: bool,
}

impl ChunkingConfig {
    pub fn from_env() -> Self {
        Self {
            chunk_size: super::helpers::env_usize("NE_CHUNK_SIZE", 1000),
            overlap: super::helpers::env_usize("NE_CHUNK_OVERLAP", 200),
            preserve_newlines: super::helpers::env_bool("NE_CHUNK_PRESERVE_NEWLINES", false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub default_limit: usize,
    pub semantic_weight: f64,
    pub keyword_weight: f64,
    pub rrf_k: f64,
}

impl RetrievalConfig {
    pub fn from_env() -> Self {
        Self {
            default_limit: super::helpers::env_usize("NE_RETRIEVAL_DEFAULT_LIMIT", 10),
            semantic_weight: super::helpers::env_f64("NE_RETRIEVAL_SEMANTIC_WEIGHT", 0.7),
            keyword_weight: super::helpers::env_f64("NE_RETRIEVAL_KEYWORD_WEIGHT", 0.3),
            rrf_k: super::helpers::env_f64("NE_RETRIEVAL_RRF_K", 60.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    pub max_upload_bytes: u64,
}

impl IngestionConfig {
    pub fn from_env() -> Self {
        Self {
            max_upload_bytes: super::helpers::env_u64("NE_MAX_UPLOAD_BYTES", 50 * 1024 * 1024),
        }
    }
}

// src/config/memory.rs
// Memory/fact retention and consolidation configuration (spec §4.2, §4.4)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Decay rate lambda in the exponential time-decay term, default 0.1 (spec §4.4).
    pub decay_lambda: f64,
    /// Default semantic-search result count (spec §4.2 K=10).
    pub search_top_k: usize,
    /// Vector dimensionality for Memory/Fact/Knowledge embeddings.
    pub embedding_dim: usize,
}

impl RetentionConfig {
    pub fn from_env() -> Self {
        Self {
            decay_lambda: super::helpers::env_f64("NE_RETENTION_DECAY_LAMBDA", 0.1),
            search_top_k: super::helpers::env_usize("NE_MEMORY_SEARCH_TOP_K", 10),
            embedding_dim: super::helpers::env_usize("NE_EMBEDDING_DIM", 1536),
        }
    }
}

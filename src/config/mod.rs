// src/config/mod.rs
// Central configuration for the engine, composed from orthogonal domain groups.

pub mod helpers;
pub mod knowledge;
pub mod memory;
pub mod server;
pub mod services;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

lazy_static! {
    pub static ref CONFIG: EngineConfig = EngineConfig::from_env();
}

/// Main configuration structure — composes all domain configs (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub env: String,
    pub server: server::ServerConfig,
    pub database: server::DatabaseConfig,
    pub logging: server::LoggingConfig,
    pub tracing: server::TracingConfig,
    pub rate_limit: server::RateLimitConfig,
    pub retention: memory::RetentionConfig,
    pub chunking: knowledge::ChunkingConfig,
    pub retrieval: knowledge::RetrievalConfig,
    pub ingestion: knowledge::IngestionConfig,
    pub services: services::ServicesConfig,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        load_dotenv_chain();

        Self {
            env: helpers::env_or("NE_ENV", "development"),
            server: server::ServerConfig::from_env(),
            database: server::DatabaseConfig::from_env(),
            logging: server::LoggingConfig::from_env(),
            tracing: server::TracingConfig::from_env(),
            rate_limit: server::RateLimitConfig::from_env(),
            retention: memory::RetentionConfig::from_env(),
            chunking: knowledge::ChunkingConfig::from_env(),
            retrieval: knowledge::RetrievalConfig::from_env(),
            ingestion: knowledge::IngestionConfig::from_env(),
            services: services::ServicesConfig::from_env(),
        }
    }

    pub fn bind_address(&self) -> String {
        self.server.bind_address()
    }

    /// Validate config on startup.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database.url.is_empty() {
            anyhow::bail!("DATABASE_URL must not be empty");
        }
        if self.retrieval.semantic_weight < 0.0 || self.retrieval.keyword_weight < 0.0 {
            anyhow::bail!("retrieval weights must be non-negative");
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Load .env files with increasing precedence: `.env` < `.env.local` <
/// `.env.{NE_ENV}` < `.env.{NE_ENV}.local` (spec §6). Later files override
/// variables already present in the process environment.
fn load_dotenv_chain() {
    let env_name = std::env::var("NE_ENV").unwrap_or_else(|_| "development".to_string());
    let candidates = [
        ".env".to_string(),
        ".env.local".to_string(),
        format!(".env.{}", env_name),
        format!(".env.{}.local", env_name),
    ];
    for path in candidates {
        let _ = dotenvy::from_filename_override(&path);
    }
}

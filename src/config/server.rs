// src/config/server.rs
// Server, database, logging, and tracing configuration groups

use serde::{Deserialize, Serialize};

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: super::helpers::env_or("NE_HOST", "0.0.0.0"),
            port: super::helpers::env_u32("NE_PORT", 8080) as u16,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database pool configuration (spec §5: pool size ~5, overflow ~10, recycle ~1h)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
    pub overflow: u32,
    pub recycle_seconds: u64,
    pub schema: String,
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        Self {
            url: super::helpers::env_or(
                "DATABASE_URL",
                "postgres://localhost/negentropy",
            ),
            pool_size: super::helpers::env_u32("NE_DB_POOL_SIZE", 5),
            overflow: super::helpers::env_u32("NE_DB_OVERFLOW", 10),
            recycle_seconds: super::helpers::env_u64("NE_DB_RECYCLE_SECONDS", 3600),
            schema: super::helpers::env_or("NE_DB_SCHEMA", "negentropy"),
        }
    }

    pub fn max_connections(&self) -> u32 {
        self.pool_size + self.overflow
    }
}

/// Logging configuration group (ambient stack, spec §6)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub sinks: Vec<String>,
    pub format: String,
    pub file_path: Option<String>,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        let sinks = super::helpers::env_or("NE_LOG_SINKS", "stdio");
        Self {
            level: super::helpers::env_or("NE_LOG_LEVEL", "info"),
            sinks: sinks.split(',').map(|s| s.trim().to_string()).collect(),
            format: super::helpers::env_or("NE_LOG_FORMAT", "console"),
            file_path: std::env::var("NE_LOG_FILE").ok(),
        }
    }

    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}

/// Tracing configuration group (spec §4.6, §6)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracingConfig {
    pub service_name: String,
    pub otlp_endpoint: Option<String>,
    pub enable_db_export: bool,
    pub enable_console_export: bool,
    pub batch_size: usize,
    pub flush_interval_secs: u64,
}

impl TracingConfig {
    pub fn from_env() -> Self {
        Self {
            service_name: super::helpers::env_or("NE_TRACING_SERVICE_NAME", "negentropy-engine"),
            otlp_endpoint: std::env::var("NE_TRACING_OTLP_ENDPOINT").ok(),
            enable_db_export: super::helpers::env_bool("NE_TRACING_ENABLE_DB_EXPORT", true),
            enable_console_export: super::helpers::env_bool("NE_TRACING_ENABLE_CONSOLE_EXPORT", false),
            batch_size: super::helpers::env_usize("NE_TRACING_BATCH_SIZE", 512),
            flush_interval_secs: super::helpers::env_u64("NE_TRACING_FLUSH_INTERVAL_SECS", 5),
        }
    }
}

/// Rate limiting / retry configuration for outbound provider calls (spec §5)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub embedding_timeout_secs: u64,
    pub rerank_timeout_secs: u64,
    pub llm_timeout_secs: u64,
    pub fetch_timeout_secs: u64,
    pub max_retries: u32,
    pub base_backoff_secs: u64,
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        Self {
            embedding_timeout_secs: super::helpers::env_u64("NE_EMBEDDING_TIMEOUT_SECS", 10),
            rerank_timeout_secs: super::helpers::env_u64("NE_RERANK_TIMEOUT_SECS", 10),
            llm_timeout_secs: super::helpers::env_u64("NE_LLM_TIMEOUT_SECS", 30),
            fetch_timeout_secs: super::helpers::env_u64("NE_FETCH_TIMEOUT_SECS", 10),
            max_retries: super::helpers::env_u32("NE_MAX_RETRIES", 3),
            base_backoff_secs: super::helpers::env_u64("NE_BASE_BACKOFF_SECS", 1),
        }
    }
}

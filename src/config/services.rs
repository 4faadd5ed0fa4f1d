// src/config/services.rs
// Backend-selection configuration for the service factories (spec §4.7)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    Memory,
    Database,
    Cloud,
}

impl Backend {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "memory" => Backend::Memory,
            "cloud" => Backend::Cloud,
            _ => Backend::Database,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    pub session_backend: Backend,
    pub memory_backend: Backend,
    pub credential_backend: Backend,
    pub artifact_backend: Backend,
}

impl ServicesConfig {
    pub fn from_env() -> Self {
        Self {
            session_backend: Backend::parse(&super::helpers::env_or("NE_SESSION_BACKEND", "database")),
            memory_backend: Backend::parse(&super::helpers::env_or("NE_MEMORY_BACKEND", "database")),
            credential_backend: Backend::parse(&super::helpers::env_or("NE_CREDENTIAL_BACKEND", "database")),
            artifact_backend: Backend::parse(&super::helpers::env_or("NE_ARTIFACT_BACKEND", "memory")),
        }
    }
}

// src/error.rs
// Typed domain errors shared by every service; the HTTP boundary is the sole
// translator from this enum to status + payload (spec §7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("version conflict: expected {expected}, found {actual}")]
    VersionConflict { expected: i64, actual: i64 },

    #[error("embedding failed: {0}")]
    EmbeddingFailed(String),

    #[error("search error: {0}")]
    SearchError(String),

    #[error("content fetch failed: {0}")]
    ContentFetchFailed(String),

    #[error("content extraction failed: {0}")]
    ContentExtractionFailed(String),

    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("infrastructure error: {0}")]
    InfrastructureError(String),
}

impl DomainError {
    /// Stable machine code used in the HTTP error payload and in structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::InvalidArgument(_) => "INVALID_ARGUMENT",
            DomainError::NotFound(_) => "NOT_FOUND",
            DomainError::VersionConflict { .. } => "VERSION_CONFLICT",
            DomainError::EmbeddingFailed(_) => "EMBEDDING_FAILED",
            DomainError::SearchError(_) => "SEARCH_ERROR",
            DomainError::ContentFetchFailed(_) => "CONTENT_FETCH_FAILED",
            DomainError::ContentExtractionFailed(_) => "CONTENT_EXTRACTION_FAILED",
            DomainError::DatabaseError(_) => "DATABASE_ERROR",
            DomainError::InfrastructureError(_) => "INFRASTRUCTURE_ERROR",
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

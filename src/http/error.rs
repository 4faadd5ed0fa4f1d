// src/http/error.rs
// Single translator from DomainError to HTTP status + JSON payload (spec §7).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::DomainError;

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DomainError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::VersionConflict { .. } => StatusCode::CONFLICT,
            DomainError::EmbeddingFailed(_)
            | DomainError::SearchError(_)
            | DomainError::ContentFetchFailed(_)
            | DomainError::ContentExtractionFailed(_)
            | DomainError::DatabaseError(_)
            | DomainError::InfrastructureError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        tracing::error!(code = self.0.code(), error = %self.0, "request failed");

        let body = ErrorBody {
            code: self.0.code(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_conflict_maps_to_409() {
        let err = ApiError(DomainError::VersionConflict { expected: 1, actual: 2 });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = ApiError(DomainError::NotFound("corpus x".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

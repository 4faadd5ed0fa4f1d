// src/http/app_name.rs
// Tenant scoping (spec glossary "App / app_name"): every row carries it, so
// every handler needs one. Auth is an external collaborator (spec §6) that
// this repository does not implement; until that collaborator is wired in,
// the tenant label travels on an explicit header set by the caller.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;

pub const APP_NAME_HEADER: &str = "x-app-name";

pub struct AppName(pub String);

impl<S> FromRequestParts<S> for AppName
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(APP_NAME_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(|v| AppName(v.to_string()))
            .ok_or((StatusCode::BAD_REQUEST, "missing x-app-name header"))
    }
}

// src/models/credential.rs
// Credential — per-(app,user,key) opaque JSON payload (spec §3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Credential {
    pub app_name: String,
    pub user_id: String,
    pub credential_key: String,
    pub credential_data: Value,
    pub updated_at: DateTime<Utc>,
}

// src/models/artifact.rs
// Artifact — opaque binary blob reference (spec §2: pluggable in-memory / object store).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub app_name: String,
    pub user_id: String,
    pub artifact_key: String,
    pub content_type: String,
    pub data: Vec<u8>,
    pub updated_at: DateTime<Utc>,
}

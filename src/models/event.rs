// src/models/event.rs
// Event — append-only conversation turn (spec §3, §9 REDESIGN FLAGS).
//
// The source normalizes duck-typed event content at read/write time (strings,
// nested objects, byte payloads coerced ad hoc). Here content is a tagged sum
// type with a canonical wire form instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAuthor {
    User,
    Agent,
    Tool,
}

impl EventAuthor {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventAuthor::User => "user",
            EventAuthor::Agent => "agent",
            EventAuthor::Tool => "tool",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(EventAuthor::User),
            "agent" | "model" | "assistant" => Some(EventAuthor::Agent),
            "tool" => Some(EventAuthor::Tool),
            _ => None,
        }
    }
}

/// One part of a structured `Parts` event content, e.g. a text segment or a
/// tool-call/tool-result fragment. Kept minimal to what consolidation needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Content of an event. Replaces the source's ad hoc dict/bytes/string
/// normalization with an explicit tagged variant (spec §9).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventContent {
    Text(String),
    Parts(Vec<Part>),
    /// Base64-encoded over the JSON wire.
    Blob(#[serde(with = "base64_bytes")] Vec<u8>),
}

impl EventContent {
    /// Extracts plain text for consolidation purposes (spec §4.2 step 3):
    /// textual parts only, concatenated.
    pub fn extract_text(&self) -> Option<String> {
        match self {
            EventContent::Text(s) if !s.is_empty() => Some(s.clone()),
            EventContent::Text(_) => None,
            EventContent::Parts(parts) => {
                let joined: Vec<&str> = parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .filter(|s| !s.is_empty())
                    .collect();
                if joined.is_empty() {
                    None
                } else {
                    Some(joined.join("\n"))
                }
            }
            EventContent::Blob(_) => None,
        }
    }

    pub fn has_content(&self) -> bool {
        match self {
            EventContent::Text(s) => !s.is_empty(),
            EventContent::Parts(p) => !p.is_empty(),
            EventContent::Blob(b) => !b.is_empty(),
        }
    }
}

mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        base64::engine::general_purpose::STANDARD
            .decode(s.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub invocation_id: Option<String>,
    pub author: String,
    pub event_type: String,
    pub content: Value,
    pub actions: Value,
    pub sequence_num: i64,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn content_typed(&self) -> Option<EventContent> {
        serde_json::from_value(self.content.clone()).ok()
    }

    pub fn state_delta(&self) -> std::collections::HashMap<String, Value> {
        self.actions
            .get("state_delta")
            .and_then(|v| v.as_object())
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    /// Non-tool events have content and at least one part (spec §4.1 title gate).
    pub fn is_non_tool_with_content(&self) -> bool {
        if self.author == "tool" {
            return false;
        }
        match self.content_typed() {
            Some(content) => content.has_content(),
            None => false,
        }
    }
}

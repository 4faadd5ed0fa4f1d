// src/models/state.rs
// UserState and AppState — prefix-routed shallow-merged state (spec §3, §4.1).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserState {
    pub user_id: String,
    pub app_name: String,
    pub state: Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AppState {
    pub app_name: String,
    pub state: Value,
    pub updated_at: DateTime<Utc>,
}

/// Shallow-merge `delta` into `existing`: delta overwrites top-level keys only,
/// no recursive merge (spec §4.1).
pub fn shallow_merge(existing: &Value, delta: &std::collections::HashMap<String, Value>) -> Value {
    let mut out = match existing {
        Value::Object(map) => map.clone(),
        _ => serde_json::Map::new(),
    };
    for (k, v) in delta {
        out.insert(k.clone(), v.clone());
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn shallow_merge_overwrites_top_level_only() {
        let existing = json!({"a": {"x": 1}, "b": 2});
        let mut delta = std::collections::HashMap::new();
        delta.insert("a".to_string(), json!({"y": 2}));
        delta.insert("c".to_string(), json!(3));
        let merged = shallow_merge(&existing, &delta);
        assert_eq!(merged, json!({"a": {"y": 2}, "b": 2, "c": 3}));
    }

    #[test]
    fn shallow_merge_on_non_object_existing_starts_empty() {
        let existing = Value::Null;
        let mut delta = std::collections::HashMap::new();
        delta.insert("k".to_string(), json!(1));
        let merged = shallow_merge(&existing, &delta);
        assert_eq!(merged, json!({"k": 1}));
    }
}

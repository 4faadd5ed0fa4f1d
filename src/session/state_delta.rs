// src/session/state_delta.rs
// Prefix-scoped state-delta routing (spec §4.1).

use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct RoutedDelta {
    /// Keys with no prefix, destined for `Thread.state`.
    pub thread: HashMap<String, Value>,
    /// Keys prefixed `user:`, destined for `UserState`.
    pub user: HashMap<String, Value>,
    /// Keys prefixed `app:`, destined for `AppState`.
    pub app: HashMap<String, Value>,
    /// Keys prefixed `temp:`, never persisted.
    pub temp: HashMap<String, Value>,
}

const USER_PREFIX: &str = "user:";
const APP_PREFIX: &str = "app:";
const TEMP_PREFIX: &str = "temp:";

/// Routes a flat `state_delta` map by key prefix. The prefix itself is
/// stripped from the key before it lands in its destination bucket.
pub fn route(delta: &HashMap<String, Value>) -> RoutedDelta {
    let mut routed = RoutedDelta::default();
    for (key, value) in delta {
        if let Some(rest) = key.strip_prefix(TEMP_PREFIX) {
            routed.temp.insert(rest.to_string(), value.clone());
        } else if let Some(rest) = key.strip_prefix(USER_PREFIX) {
            routed.user.insert(rest.to_string(), value.clone());
        } else if let Some(rest) = key.strip_prefix(APP_PREFIX) {
            routed.app.insert(rest.to_string(), value.clone());
        } else {
            routed.thread.insert(key.clone(), value.clone());
        }
    }
    routed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn routes_each_prefix_to_its_bucket() {
        let mut delta = HashMap::new();
        delta.insert("k".to_string(), json!(1));
        delta.insert("user:pref".to_string(), json!("dark"));
        delta.insert("app:feat".to_string(), json!("on"));
        delta.insert("temp:x".to_string(), json!(9));

        let routed = route(&delta);
        assert_eq!(routed.thread.get("k"), Some(&json!(1)));
        assert_eq!(routed.user.get("pref"), Some(&json!("dark")));
        assert_eq!(routed.app.get("feat"), Some(&json!("on")));
        assert_eq!(routed.temp.get("x"), Some(&json!(9)));
    }

    #[test]
    fn empty_delta_routes_to_nothing() {
        let routed = route(&HashMap::new());
        assert!(routed.thread.is_empty());
        assert!(routed.user.is_empty());
        assert!(routed.app.is_empty());
        assert!(routed.temp.is_empty());
    }
}

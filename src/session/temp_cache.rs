// src/session/temp_cache.rs
// In-process cache for `temp:`-prefixed state-delta keys (spec §4.1, §5):
// never persisted, keyed by session id, evicted on session deletion or
// process restart (the latter falls out for free — it's in memory only).

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Default)]
pub struct TempCache {
    sessions: RwLock<HashMap<String, HashMap<String, Value>>>,
}

impl TempCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&self, session_id: &str, delta: &HashMap<String, Value>) {
        if delta.is_empty() {
            return;
        }
        let mut sessions = self.sessions.write();
        let entry = sessions.entry(session_id.to_string()).or_default();
        for (k, v) in delta {
            entry.insert(k.clone(), v.clone());
        }
    }

    pub fn get(&self, session_id: &str) -> HashMap<String, Value> {
        self.sessions
            .read()
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn evict(&self, session_id: &str) {
        self.sessions.write().remove(session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn apply_and_get_roundtrip() {
        let cache = TempCache::new();
        let mut delta = HashMap::new();
        delta.insert("x".to_string(), json!(9));
        cache.apply("s1", &delta);
        assert_eq!(cache.get("s1").get("x"), Some(&json!(9)));
        assert!(cache.get("s2").is_empty());
    }

    #[test]
    fn evict_clears_session() {
        let cache = TempCache::new();
        let mut delta = HashMap::new();
        delta.insert("x".to_string(), json!(1));
        cache.apply("s1", &delta);
        cache.evict("s1");
        assert!(cache.get("s1").is_empty());
    }
}

// src/memory/consolidation.rs
// Memory Consolidation — transforms a session's event stream into a Memory
// row (spec §4.2, component "Memory Consolidation").

use serde_json::json;
use uuid::Uuid;

use super::NewMemory;
use crate::models::Event;

/// Builds the combined textual content for a session snapshot, per
/// spec §4.2 steps 1-5:
/// 1. Iterate events in sequence order (caller must pass them pre-sorted).
/// 2. Select events where author is user or agent.
/// 3. Extract textual parts only.
/// 4. Concatenate with line breaks.
/// 5. Empty input -> no content (caller should skip the write).
pub fn build_combined_content(events: &[Event]) -> Option<String> {
    let parts: Vec<String> = events
        .iter()
        .filter(|e| e.author == "user" || e.author == "agent" || e.author == "model" || e.author == "assistant")
        .filter_map(|e| e.content_typed().and_then(|c| c.extract_text()))
        .collect();

    if parts.is_empty() {
        return None;
    }
    let combined = parts.join("\n");
    if combined.trim().is_empty() {
        None
    } else {
        Some(combined)
    }
}

/// Builds the `NewMemory` to persist for a consolidated session, with
/// `memory_type = "episodic"` and `metadata = {source: "session", event_count: N}`
/// (spec §4.2 step 7). Returns `None` if there is nothing to consolidate.
pub fn build_episodic_memory(
    thread_id: Uuid,
    user_id: &str,
    app_name: &str,
    events: &[Event],
    embedding: Option<Vec<f32>>,
) -> Option<NewMemory> {
    let content = build_combined_content(events)?;
    Some(NewMemory {
        thread_id: Some(thread_id),
        user_id: user_id.to_string(),
        app_name: app_name.to_string(),
        memory_type: "episodic".to_string(),
        content,
        embedding,
        metadata: json!({ "source": "session", "event_count": events.len() }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Event, EventContent};
    use chrono::Utc;

    fn event(author: &str, text: &str) -> Event {
        Event {
            id: Uuid::new_v4(),
            thread_id: Uuid::new_v4(),
            invocation_id: None,
            author: author.to_string(),
            event_type: "message".to_string(),
            content: serde_json::to_value(EventContent::Text(text.to_string())).unwrap(),
            actions: json!({}),
            sequence_num: 1,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn combines_user_and_agent_text_with_newlines() {
        let events = vec![event("user", "hi"), event("agent", "hello"), event("tool", "ignored")];
        assert_eq!(build_combined_content(&events), Some("hi\nhello".to_string()));
    }

    #[test]
    fn empty_events_produce_no_content() {
        assert_eq!(build_combined_content(&[]), None);
    }

    #[test]
    fn tool_only_events_produce_no_content() {
        let events = vec![event("tool", "output")];
        assert_eq!(build_combined_content(&events), None);
    }

    #[test]
    fn builds_episodic_memory_with_source_and_event_count_metadata() {
        let thread_id = Uuid::new_v4();
        let events = vec![event("user", "hi"), event("agent", "hello")];
        let memory = build_episodic_memory(thread_id, "u1", "app", &events, None).unwrap();
        assert_eq!(memory.memory_type, "episodic");
        assert_eq!(memory.metadata["source"], "session");
        assert_eq!(memory.metadata["event_count"], 2);
        assert_eq!(memory.content, "hi\nhello");
    }
}

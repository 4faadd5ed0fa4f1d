// src/session/title.rs
// Title Summarizer — generates a short conversation title after the first
// user+agent exchange (spec §4.1 step 4, component table "Title Summarizer").

use async_trait::async_trait;

use crate::models::Event;

#[async_trait]
pub trait TitleSummarizer: Send + Sync {
    /// Given the last few non-tool events (oldest first), produce a short
    /// title. Failure here is logged by the caller and never fails the
    /// append that triggered it.
    async fn summarize(&self, recent_events: &[Event]) -> anyhow::Result<String>;
}

/// A summarizer with no LLM behind it — truncates the first user message.
/// Useful as a default when no LLM provider is wired in, and in tests.
pub struct FallbackTitleSummarizer;

#[async_trait]
impl TitleSummarizer for FallbackTitleSummarizer {
    async fn summarize(&self, recent_events: &[Event]) -> anyhow::Result<String> {
        let first_text = recent_events
            .iter()
            .find_map(|e| e.content_typed().and_then(|c| c.extract_text()))
            .unwrap_or_else(|| "Untitled conversation".to_string());
        let mut title: String = first_text.chars().take(60).collect();
        if first_text.chars().count() > 60 {
            title.push('\u{2026}');
        }
        Ok(title)
    }
}

/// Determines whether title generation should be scheduled after an append
/// (spec §4.1 step 4): the thread has no title yet AND now has at least two
/// non-tool events with content.
pub fn should_generate_title(existing_title: Option<&str>, non_tool_event_count_with_content: usize) -> bool {
    existing_title.map(|t| t.is_empty()).unwrap_or(true) && non_tool_event_count_with_content >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gates_on_absent_title_and_two_non_tool_events() {
        assert!(!should_generate_title(None, 1));
        assert!(should_generate_title(None, 2));
        assert!(!should_generate_title(Some("Existing"), 5));
        assert!(should_generate_title(Some(""), 2));
    }
}

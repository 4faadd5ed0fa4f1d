// src/utils/sql.rs
// Helpers for building raw SQL fragments safely.

/// Escapes `%`, `_`, and `\` in a user-supplied substring before it is
/// wrapped in wildcards for a `LIKE`/`ILIKE` pattern, so the caller's input
/// is matched literally rather than as a wildcard expression.
pub fn escape_like_pattern(input: &str) -> String {
    input.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_wildcard_characters() {
        assert_eq!(escape_like_pattern("100%"), "100\\%");
        assert_eq!(escape_like_pattern("a_b"), "a\\_b");
        assert_eq!(escape_like_pattern(r"a\b"), r"a\\b");
    }

    #[test]
    fn leaves_plain_text_untouched() {
        assert_eq!(escape_like_pattern("hello world"), "hello world");
    }
}

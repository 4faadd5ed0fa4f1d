// src/knowledge/chunking.rs
// Deterministic text chunker (spec §4.5). Grounded on
// original_source/.../knowledge/chunking.py.

#[derive(Debug, Clone, Copy)]
pub struct ChunkingParams {
    pub chunk_size: usize,
    pub overlap: i64,
    pub preserve_newlines: bool,
}

pub fn chunk_text(text: &str, params: ChunkingParams) -> Vec<String> {
    let cleaned = text.trim();
    if cleaned.is_empty() {
        return Vec::new();
    }

    let chunk_size = params.chunk_size.max(1);
    let overlap = params.overlap.max(0).min(chunk_size as i64 - 1) as usize;
    let step = chunk_size.saturating_sub(overlap).max(1);

    let chars: Vec<char> = cleaned.chars().collect();
    let length = chars.len();

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < length {
        let end = length.min(start + chunk_size);
        let mut piece: String = chars[start..end].iter().collect();
        if !params.preserve_newlines {
            piece = piece.lines().collect::<Vec<_>>().join(" ");
        }
        let piece = piece.trim();
        if !piece.is_empty() {
            chunks.push(piece.to_string());
        }
        start += step;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(chunk_size: usize, overlap: i64, preserve_newlines: bool) -> ChunkingParams {
        ChunkingParams {
            chunk_size,
            overlap,
            preserve_newlines,
        }
    }

    #[test]
    fn empty_input_produces_no_chunks() {
        assert!(chunk_text("", params(10, 0, true)).is_empty());
        assert!(chunk_text("   \n  ", params(10, 0, true)).is_empty());
    }

    #[test]
    fn chunking_is_deterministic() {
        let text = "the quick brown fox jumps over the lazy dog";
        let a = chunk_text(text, params(10, 3, true));
        let b = chunk_text(text, params(10, 3, true));
        assert_eq!(a, b);
    }

    #[test]
    fn overlap_is_clamped_below_chunk_size() {
        // overlap >= chunk_size would make step 0; clamped to chunk_size - 1 -> step 1.
        let text = "abcdefgh";
        let chunks = chunk_text(text, params(3, 10, true));
        assert_eq!(chunks, vec!["abc", "bcd", "cde", "def", "efg", "fgh", "gh", "h"]);
    }

    #[test]
    fn negative_overlap_clamped_to_zero() {
        let text = "abcdef";
        let chunks = chunk_text(text, params(3, -5, true));
        assert_eq!(chunks, vec!["abc", "def"]);
    }

    #[test]
    fn collapses_internal_newlines_unless_preserved() {
        let text = "line one\nline two";
        let collapsed = chunk_text(text, params(100, 0, false));
        assert_eq!(collapsed, vec!["line one line two"]);
        let preserved = chunk_text(text, params(100, 0, true));
        assert_eq!(preserved, vec!["line one\nline two"]);
    }

    #[test]
    fn drops_empty_pieces_after_trim() {
        let text = "a\n\n\n\nb";
        let chunks = chunk_text(text, params(2, 0, false));
        assert!(chunks.iter().all(|c| !c.is_empty()));
    }
}

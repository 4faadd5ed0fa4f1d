// src/knowledge/retrieval/rrf.rs
// Reciprocal-rank fusion (spec §4.5 mode 4):
//   rrf_score = sum_over_lists(1 / (k + rank))   # rank is 1-based
// Scale-invariant: only list order matters, not the underlying scores.

use std::collections::HashMap;

use super::ScoredChunk;

pub fn combine(semantic: Vec<ScoredChunk>, keyword: Vec<ScoredChunk>, k: f64, limit: usize) -> Vec<ScoredChunk> {
    let mut by_id: HashMap<_, ScoredChunk> = HashMap::new();
    let mut scores: HashMap<_, f64> = HashMap::new();

    for (rank, chunk) in semantic.into_iter().enumerate() {
        let id = chunk.knowledge_id;
        *scores.entry(id).or_insert(0.0) += 1.0 / (k + (rank + 1) as f64);
        by_id.insert(id, chunk);
    }
    for (rank, chunk) in keyword.into_iter().enumerate() {
        let id = chunk.knowledge_id;
        *scores.entry(id).or_insert(0.0) += 1.0 / (k + (rank + 1) as f64);
        by_id.entry(id).or_insert(chunk);
    }

    let mut merged: Vec<ScoredChunk> = by_id
        .into_iter()
        .map(|(id, mut chunk)| {
            chunk.combined_score = scores[&id];
            chunk
        })
        .collect();

    merged.sort_by(|a, b| b.combined_score.partial_cmp(&a.combined_score).unwrap_or(std::cmp::Ordering::Equal));
    merged.truncate(limit);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn chunk(id: Uuid) -> ScoredChunk {
        ScoredChunk {
            knowledge_id: id,
            content: "x".to_string(),
            source_uri: None,
            metadata: json!({}),
            semantic_score: None,
            keyword_score: None,
            combined_score: 0.0,
        }
    }

    #[test]
    fn top_rank_in_both_lists_wins() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let semantic = vec![chunk(a), chunk(b)];
        let keyword = vec![chunk(a), chunk(b)];
        let merged = combine(semantic, keyword, 60.0, 2);
        assert_eq!(merged[0].knowledge_id, a);
        let expected = 2.0 / 61.0;
        assert!((merged[0].combined_score - expected).abs() < 1e-9);
    }

    #[test]
    fn is_insensitive_to_underlying_score_scale() {
        // Two runs with wildly different raw scores but identical rank order
        // must produce identical rrf output.
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let run1 = combine(vec![chunk(a), chunk(b)], vec![], 60.0, 2);
        let run2 = combine(vec![chunk(a), chunk(b)], vec![], 60.0, 2);
        assert_eq!(run1[0].combined_score, run2[0].combined_score);
    }
}

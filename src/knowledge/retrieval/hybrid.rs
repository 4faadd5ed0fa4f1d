// src/knowledge/retrieval/hybrid.rs
// Weighted-hybrid combination (spec §4.5 mode 3):
//   combined = w_sem * semantic_score + w_kw * keyword_score
// Missing scores default to 0. Sort descending, limit K.

use std::collections::HashMap;

use super::ScoredChunk;

pub fn combine(
    semantic: Vec<ScoredChunk>,
    keyword: Vec<ScoredChunk>,
    w_sem: f64,
    w_kw: f64,
    limit: usize,
) -> Vec<ScoredChunk> {
    let mut by_id: HashMap<_, ScoredChunk> = HashMap::new();

    for chunk in semantic {
        by_id.insert(chunk.knowledge_id, chunk);
    }
    for chunk in keyword {
        by_id
            .entry(chunk.knowledge_id)
            .and_modify(|existing| existing.keyword_score = chunk.keyword_score)
            .or_insert(chunk);
    }

    let mut merged: Vec<ScoredChunk> = by_id
        .into_values()
        .map(|mut chunk| {
            let sem = chunk.semantic_score.unwrap_or(0.0);
            let kw = chunk.keyword_score.unwrap_or(0.0);
            chunk.combined_score = w_sem * sem + w_kw * kw;
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

    fn chunk(id: Uuid, sem: Option<f64>, kw: Option<f64>) -> ScoredChunk {
        ScoredChunk {
            knowledge_id: id,
            content: "x".to_string(),
            source_uri: None,
            metadata: json!({}),
            semantic_score: sem,
            keyword_score: kw,
            combined_score: 0.0,
        }
    }

    #[test]
    fn missing_scores_default_to_zero() {
        let id_a = Uuid::new_v4();
        let id_b = Uuid::new_v4();
        let semantic = vec![chunk(id_a, Some(0.9), None)];
        let keyword = vec![chunk(id_b, None, Some(0.4))];

        let merged = combine(semantic, keyword, 0.7, 0.3, 10);
        let a = merged.iter().find(|c| c.knowledge_id == id_a).unwrap();
        let b = merged.iter().find(|c| c.knowledge_id == id_b).unwrap();
        assert!((a.combined_score - 0.63).abs() < 1e-9);
        assert!((b.combined_score - 0.12).abs() < 1e-9);
    }

    #[test]
    fn matches_the_documented_three_chunk_scenario() {
        let c1 = Uuid::new_v4();
        let c2 = Uuid::new_v4();
        let c3 = Uuid::new_v4();
        let semantic = vec![chunk(c1, Some(0.9), None), chunk(c2, Some(0.5), None)];
        let keyword = vec![chunk(c2, None, Some(0.8)), chunk(c3, None, Some(0.4))];

        let merged = combine(semantic, keyword, 0.7, 0.3, 3);
        let ids: Vec<Uuid> = merged.iter().map(|c| c.knowledge_id).collect();
        assert_eq!(ids, vec![c1, c2, c3]);
        assert!((merged[0].combined_score - 0.63).abs() < 1e-6);
        assert!((merged[1].combined_score - 0.59).abs() < 1e-6);
        assert!((merged[2].combined_score - 0.12).abs() < 1e-6);
    }

    #[test]
    fn sorts_descending_and_respects_limit() {
        let ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        let semantic: Vec<ScoredChunk> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| chunk(*id, Some(i as f64 / 10.0), None))
            .collect();
        let merged = combine(semantic, Vec::new(), 1.0, 0.0, 2);
        assert_eq!(merged.len(), 2);
        assert!(merged[0].combined_score >= merged[1].combined_score);
    }
}

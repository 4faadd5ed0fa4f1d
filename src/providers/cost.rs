// src/providers/cost.rs
// Pluggable LLM cost attribution (spec §9 Open Question): the source bakes a
// local per-million-token price table into the codebase whose source currency
// ratio is externally maintained. The target keeps this pluggable instead of
// hard-coding values.

use std::sync::Arc;

/// `cost_of(model, prompt_tokens, completion_tokens) -> USD?`
pub type CostFn = Arc<dyn Fn(&str, u32, u32) -> Option<f64> + Send + Sync>;

/// Default cost function: no pricing information available.
pub fn null_cost_fn() -> CostFn {
    Arc::new(|_model: &str, _prompt: u32, _completion: u32| None)
}

/// Builds a cost function from a simple per-million-token price table, for
/// callers that do want to wire one in at startup. Kept as one possible
/// implementation, not the default.
pub fn table_cost_fn(
    prices: Vec<(String, f64, f64)>, // (model, prompt_usd_per_million, completion_usd_per_million)
) -> CostFn {
    Arc::new(move |model: &str, prompt_tokens: u32, completion_tokens: u32| {
        prices.iter().find(|(m, _, _)| m == model).map(|(_, p, c)| {
            (prompt_tokens as f64 / 1_000_000.0) * p
                + (completion_tokens as f64 / 1_000_000.0) * c
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_cost_fn_always_none() {
        let f = null_cost_fn();
        assert_eq!(f("gpt-4", 100, 50), None);
    }

    #[test]
    fn table_cost_fn_computes_for_known_model() {
        let f = table_cost_fn(vec![("gpt-4".to_string(), 30.0, 60.0)]);
        let cost = f("gpt-4", 1_000_000, 1_000_000).unwrap();
        assert!((cost - 90.0).abs() < 1e-9);
        assert_eq!(f("unknown", 1, 1), None);
    }
}

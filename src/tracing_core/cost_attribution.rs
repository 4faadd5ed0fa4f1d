// src/tracing_core/cost_attribution.rs
// LLM-span attribute decoration (spec §4.6): gen_ai.request.model,
// gen_ai.usage.cost, langfuse.observation.cost_details.

use serde_json::{json, Value};

use crate::providers::cost::CostFn;
use crate::providers::Usage;

/// Cost priority order (spec §4.6): explicit `response_cost` field first,
/// then a provider-computed breakdown, then the local price table.
pub fn resolve_cost(
    response_cost: Option<f64>,
    provider_breakdown_cost: Option<f64>,
    model: &str,
    usage: &Usage,
    cost_fn: &CostFn,
) -> Option<f64> {
    response_cost
        .or(provider_breakdown_cost)
        .or_else(|| cost_fn(model, usage.prompt_tokens, usage.completion_tokens))
}

pub fn normalize_model_name(model: &str) -> String {
    model.trim().to_lowercase()
}

/// Builds the attribute set to attach to an LLM-call span.
pub fn llm_span_attributes(model: &str, cost: Option<f64>) -> Value {
    let mut attrs = json!({
        "gen_ai.request.model": normalize_model_name(model),
    });
    if let Some(cost) = cost {
        attrs["gen_ai.usage.cost"] = json!(cost);
        attrs["langfuse.observation.cost_details"] = json!({ "total": cost });
    }
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::cost::{null_cost_fn, table_cost_fn};

    #[test]
    fn explicit_response_cost_wins_over_everything() {
        let usage = Usage {
            prompt_tokens: 100,
            completion_tokens: 50,
        };
        let cost = resolve_cost(Some(1.23), Some(9.99), "gpt-4", &usage, &null_cost_fn());
        assert_eq!(cost, Some(1.23));
    }

    #[test]
    fn falls_back_to_price_table_when_nothing_explicit() {
        let usage = Usage {
            prompt_tokens: 1_000_000,
            completion_tokens: 1_000_000,
        };
        let cost_fn = table_cost_fn(vec![("gpt-4".to_string(), 30.0, 60.0)]);
        let cost = resolve_cost(None, None, "gpt-4", &usage, &cost_fn);
        assert_eq!(cost, Some(90.0));
    }

    #[test]
    fn span_attributes_omit_cost_fields_when_cost_unknown() {
        let attrs = llm_span_attributes("GPT-4", None);
        assert_eq!(attrs["gen_ai.request.model"], "gpt-4");
        assert!(attrs.get("gen_ai.usage.cost").is_none());
    }
}

// src/tracing_core/mod.rs
// Tracing Core (spec §4.6): batched span export, LLM-span cost decoration,
// and request-context propagation.

pub mod context;
pub mod cost_attribution;
pub mod exporter;

pub use context::{current as current_context, with_context, RequestContext};
pub use exporter::SpanExporter;

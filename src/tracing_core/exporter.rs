// src/tracing_core/exporter.rs
// Batched span exporter (spec §4.6): drains an in-memory queue and writes
// Span rows in batches (default size 512, flush interval 5s). Bounded queue;
// overflow drops the oldest span, logged at warn (spec §5 "Backpressure").

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use sqlx::PgPool;

use crate::models::Span;

pub const DEFAULT_BATCH_SIZE: usize = 512;
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_QUEUE_CAPACITY: usize = 8192;

pub struct SpanExporter {
    queue: Mutex<VecDeque<Span>>,
    capacity: usize,
    pool: PgPool,
}

impl SpanExporter {
    pub fn new(pool: PgPool, capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            pool,
        })
    }

    /// Enqueues a span for eventual export; best-effort, never blocks the
    /// hot path that produced it.
    pub fn enqueue(&self, span: Span) {
        let mut queue = self.queue.lock();
        if queue.len() >= self.capacity {
            queue.pop_front();
            tracing::warn!("span export queue full, dropping oldest span");
        }
        queue.push_back(span);
    }

    pub fn queue_len(&self) -> usize {
        self.queue.lock().len()
    }

    fn drain_batch(&self, max: usize) -> Vec<Span> {
        let mut queue = self.queue.lock();
        let take = max.min(queue.len());
        queue.drain(..take).collect()
    }

    async fn flush(&self, batch_size: usize) {
        let batch = self.drain_batch(batch_size);
        if batch.is_empty() {
            return;
        }
        if let Err(e) = self.insert_batch(&batch).await {
            tracing::warn!(error = %e, count = batch.len(), "failed to export span batch");
        }
    }

    async fn insert_batch(&self, batch: &[Span]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for span in batch {
            sqlx::query(
                r#"
                INSERT INTO spans
                    (trace_id, span_id, parent_span_id, operation_name, span_kind, attributes, events,
                     start_time, end_time, duration_ns, status_code, status_message)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                ON CONFLICT (trace_id, span_id) DO UPDATE SET
                    end_time = EXCLUDED.end_time,
                    duration_ns = EXCLUDED.duration_ns,
                    status_code = EXCLUDED.status_code,
                    status_message = EXCLUDED.status_message,
                    attributes = EXCLUDED.attributes,
                    events = EXCLUDED.events
                "#,
            )
            .bind(&span.trace_id)
            .bind(&span.span_id)
            .bind(&span.parent_span_id)
            .bind(&span.operation_name)
            .bind(&span.span_kind)
            .bind(&span.attributes)
            .bind(&span.events)
            .bind(span.start_time)
            .bind(span.end_time)
            .bind(span.duration_ns)
            .bind(&span.status_code)
            .bind(&span.status_message)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await
    }

    /// Runs the flush loop forever on the given interval. Spawn with
    /// `tokio::spawn(exporter.clone().run(...))`.
    pub async fn run(self: Arc<Self>, batch_size: usize, flush_interval: Duration) {
        let mut ticker = tokio::time::interval(flush_interval);
        loop {
            ticker.tick().await;
            self.flush(batch_size).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn span(id: &str) -> Span {
        Span {
            trace_id: "t1".to_string(),
            span_id: id.to_string(),
            parent_span_id: None,
            operation_name: "op".to_string(),
            span_kind: "internal".to_string(),
            attributes: serde_json::json!({}),
            events: serde_json::json!([]),
            start_time: Utc::now(),
            end_time: None,
            duration_ns: None,
            status_code: "unset".to_string(),
            status_message: None,
        }
    }

    #[test]
    fn overflow_drops_oldest_span() {
        let pool_fut = sqlx::postgres::PgPoolOptions::new().connect_lazy("postgres://localhost/test");
        let pool = pool_fut.expect("lazy pool construction should not touch the network");
        let exporter = SpanExporter::new(pool, 2);
        exporter.enqueue(span("a"));
        exporter.enqueue(span("b"));
        exporter.enqueue(span("c"));
        assert_eq!(exporter.queue_len(), 2);
        let batch = exporter.drain_batch(10);
        assert_eq!(batch.iter().map(|s| s.span_id.clone()).collect::<Vec<_>>(), vec!["b", "c"]);
    }
}

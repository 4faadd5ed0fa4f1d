// src/utils/timeout.rs
// Timeout utilities

use anyhow::Result;
use futures::Future;
use std::time::Duration;

/// Execute an operation with a timeout
pub async fn with_timeout<F, T>(duration: Duration, operation: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(duration, operation).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!(
            "{} timed out after {:?}",
            operation_name,
            duration
        )),
    }
}

/// Retries an outbound provider call under a per-call deadline with
/// exponential backoff (spec §5 "Cancellation & timeouts": `base * 2^attempt`,
/// default base 1s, max 3 retries). Exhausted retries surface the last error.
pub async fn with_retry<F, Fut, T>(
    deadline: Duration,
    base_backoff: Duration,
    max_retries: u32,
    operation_name: &str,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match with_timeout(deadline, operation(), operation_name).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= max_retries => return Err(e),
            Err(_) => {
                let backoff = base_backoff * 2u32.pow(attempt);
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
        }
    }
}

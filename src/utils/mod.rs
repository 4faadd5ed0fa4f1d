// src/utils/mod.rs
// Common utility functions

pub mod hash;
pub mod rate_limiter;
pub mod sql;
pub mod timeout;

pub use hash::{estimate_tokens, sha256_hash, sha256_hash_bytes};
pub use rate_limiter::RateLimiter;
pub use sql::escape_like_pattern;
pub use timeout::{with_retry, with_timeout};

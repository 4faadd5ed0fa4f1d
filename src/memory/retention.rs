// src/memory/retention.rs
// Pure retention-scoring function (spec §4.4):
//
//   days_since_access = max(0, (now - last_accessed_at) / 1 day)
//   time_decay        = exp(-lambda * days_since_access)
//   frequency_boost   = 1 + ln(1 + access_count)
//   retention_score   = clamp(time_decay * frequency_boost / 5, 0, 1)
//
// This is used by callers to decide eviction; the store itself does not
// schedule eviction.

use chrono::{DateTime, Utc};

pub fn calculate_retention_score(
    now: DateTime<Utc>,
    last_accessed_at: DateTime<Utc>,
    access_count: i64,
    decay_lambda: f64,
) -> f64 {
    let days_since_access = (now - last_accessed_at).num_seconds() as f64 / 86_400.0;
    let days_since_access = days_since_access.max(0.0);

    let time_decay = (-decay_lambda * days_since_access).exp();
    let frequency_boost = 1.0 + (1.0 + access_count as f64).ln();
    let score = time_decay * frequency_boost / 5.0;

    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn fresh_memory_with_no_accesses_scores_high() {
        let now = Utc::now();
        let score = calculate_retention_score(now, now, 0, 0.1);
        // time_decay=1, frequency_boost=1 -> 1/5 = 0.2
        assert!((score - 0.2).abs() < 1e-9);
    }

    #[test]
    fn score_is_always_in_unit_interval() {
        let now = Utc::now();
        for days in [0, 1, 10, 100, 1000] {
            for accesses in [0, 1, 10, 1000] {
                let last = now - Duration::days(days);
                let score = calculate_retention_score(now, last, accesses, 0.1);
                assert!((0.0..=1.0).contains(&score), "score {score} out of range");
            }
        }
    }

    #[test]
    fn monotonic_decreasing_in_days_since_access() {
        let now = Utc::now();
        let s0 = calculate_retention_score(now, now, 5, 0.1);
        let s10 = calculate_retention_score(now, now - Duration::days(10), 5, 0.1);
        let s100 = calculate_retention_score(now, now - Duration::days(100), 5, 0.1);
        assert!(s0 > s10);
        assert!(s10 > s100);
    }

    #[test]
    fn monotonic_non_decreasing_in_access_count() {
        let now = Utc::now();
        let last = now - Duration::days(5);
        let s0 = calculate_retention_score(now, last, 0, 0.1);
        let s5 = calculate_retention_score(now, last, 5, 0.1);
        let s50 = calculate_retention_score(now, last, 50, 0.1);
        assert!(s5 >= s0);
        assert!(s50 >= s5);
    }

    #[test]
    fn negative_elapsed_time_clamped_to_zero_days() {
        let now = Utc::now();
        let future = now + Duration::days(5);
        let score = calculate_retention_score(now, future, 0, 0.1);
        assert!((score - 0.2).abs() < 1e-9);
    }
}

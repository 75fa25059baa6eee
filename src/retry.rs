//! Backoff between delete retries.
//!
//! Exponential backoff with optional jitter, driven by [`RetryConfig`].

use cwprune_config::RetryConfig;
use rand::Rng;
use std::time::Duration;

/// Backoff before retry number `retry` (0-based).
pub fn backoff_duration(config: &RetryConfig, retry: u32) -> Duration {
    let base_ms = config
        .initial_backoff_ms
        .saturating_mul(2u64.saturating_pow(retry));
    let capped_ms = base_ms.min(config.max_backoff_ms);

    let final_ms = if config.jitter && capped_ms > 0 {
        let jitter_range = capped_ms / 4; // 25% jitter
        let jitter = rand::thread_rng().gen_range(0..=jitter_range);
        capped_ms.saturating_add(jitter)
    } else {
        capped_ms
    };

    Duration::from_millis(final_ms)
}

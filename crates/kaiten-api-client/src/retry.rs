//! Retry policy for `429 Too Many Requests` responses.
//!
//! The wait before the next attempt comes from the `X-RateLimit-Reset` header
//! when the server sends a usable Unix timestamp, and from exponential backoff
//! with random jitter otherwise.

use rand::Rng;
use reqwest::header::HeaderMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Header carrying the Unix time (seconds) at which the upstream limit resets.
pub const RATE_LIMIT_RESET_HEADER: &str = "X-RateLimit-Reset";

const DEFAULT_MAX_RETRIES: u32 = 5;
const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(1);
const DEFAULT_MAX_JITTER: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    pub backoff_base: Duration,
    /// Upper bound (exclusive) of the random jitter added to each backoff.
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: DEFAULT_BACKOFF_BASE,
            max_jitter: DEFAULT_MAX_JITTER,
        }
    }
}

impl RetryPolicy {
    /// `backoff_base * 2^retry + jitter`, jitter uniform in `[0, max_jitter)`.
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let exponential = self
            .backoff_base
            .saturating_mul(2u32.saturating_pow(retry));
        let jitter = self.max_jitter.mul_f64(rand::rng().random::<f64>());
        exponential.saturating_add(jitter)
    }

    /// How long to wait after a 429 before attempt number `retry + 1`.
    pub fn wait_for(&self, headers: &HeaderMap, retry: u32) -> Duration {
        reset_delay(headers, SystemTime::now()).unwrap_or_else(|| self.backoff_delay(retry))
    }
}

/// Time until the `X-RateLimit-Reset` timestamp, clamped at zero.
///
/// Returns `None` when the header is missing or is not a finite number, so the
/// caller can fall back to backoff.
pub fn reset_delay(headers: &HeaderMap, now: SystemTime) -> Option<Duration> {
    let raw = headers.get(RATE_LIMIT_RESET_HEADER)?.to_str().ok()?.trim();
    let reset_at: f64 = raw.parse().ok()?;
    if !reset_at.is_finite() {
        return None;
    }
    let now = now.duration_since(UNIX_EPOCH).ok()?.as_secs_f64();
    Duration::try_from_secs_f64((reset_at - now).max(0.0)).ok()
}

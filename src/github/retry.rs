// Retry policy for GitHub API requests.
// Computes exponential backoff delays, with jitter for server and network failures.

use std::time::Duration;

use rand::Rng;
use reqwest::header::{HeaderMap, RETRY_AFTER};

/// Default number of attempts per request.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay before the second attempt.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);

/// Upper bound of the random jitter, as a fraction of the base delay.
const JITTER_FRACTION: f64 = 0.1;

/// How many attempts a request gets and how long to wait between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_retries: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: DEFAULT_INITIAL_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries: max_retries.max(1),
            initial_delay,
        }
    }

    /// `initial_delay * 2^attempt`, with `attempt` counted from zero.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.initial_delay
            .saturating_mul(2u32.saturating_pow(attempt.min(16)))
    }

    /// Exponential backoff plus up to 10% random jitter.
    pub fn jittered_backoff(&self, attempt: u32) -> Duration {
        let factor = rand::rng().random_range(0.0..JITTER_FRACTION);
        apply_jitter(self.backoff(attempt), factor)
    }

    /// Delay after a 429: `Retry-After` when the server sent one, plain backoff otherwise.
    pub fn rate_limited_delay(&self, attempt: u32, headers: &HeaderMap) -> Duration {
        retry_after(headers).unwrap_or_else(|| self.backoff(attempt))
    }

    /// Whether `attempt` (zero-based) is the last one allowed.
    pub fn is_last_attempt(&self, attempt: u32) -> bool {
        attempt + 1 >= self.max_retries
    }
}

fn apply_jitter(base: Duration, factor: f64) -> Duration {
    base + base.mul_f64(factor.clamp(0.0, JITTER_FRACTION))
}

/// Parse a `Retry-After` header given in whole seconds.
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1000))
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = policy();
        assert_eq!(policy.backoff(0), Duration::from_millis(1000));
        assert_eq!(policy.backoff(1), Duration::from_millis(2000));
        assert_eq!(policy.backoff(2), Duration::from_millis(4000));
    }

    #[test]
    fn test_jitter_stays_within_ten_percent() {
        let policy = policy();
        for attempt in 0..3 {
            let base = policy.backoff(attempt);
            let delay = policy.jittered_backoff(attempt);
            assert!(delay >= base);
            assert!(delay <= base + base / 10);
        }
    }

    #[test]
    fn test_apply_jitter_clamps_factor() {
        let base = Duration::from_millis(100);
        assert_eq!(apply_jitter(base, 5.0), Duration::from_millis(110));
        assert_eq!(apply_jitter(base, -1.0), base);
    }

    #[test]
    fn test_retry_after_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("2"));

        assert_eq!(
            policy().rate_limited_delay(0, &headers),
            Duration::from_secs(2)
        );
    }

    #[test]
    fn test_rate_limited_without_header_uses_backoff() {
        let headers = HeaderMap::new();
        assert_eq!(
            policy().rate_limited_delay(1, &headers),
            Duration::from_millis(2000)
        );
    }

    #[test]
    fn test_unparseable_retry_after_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(retry_after(&headers), None);
    }

    #[test]
    fn test_at_least_one_attempt() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(policy.max_retries, 1);
        assert!(policy.is_last_attempt(0));
    }
}

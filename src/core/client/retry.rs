//! Rate-limit backoff for the request executor.

use std::time::Duration;

/// Longest single backoff sleep unless configured otherwise.
pub const BACKOFF_CEILING: Duration = Duration::from_secs(30);

/// Delay before re-issuing a request that has been rate limited `retries`
/// times already.
///
/// `floor((2^retries - 1) / 2)` seconds, clamped to [`BACKOFF_CEILING`]:
/// 0s, 0s, 1s, 3s, 7s, 15s, then 30s from the sixth retry on.
#[inline]
pub fn backoff_delay(retries: u32) -> Duration {
    backoff_delay_with_ceiling(retries, BACKOFF_CEILING)
}

pub fn backoff_delay_with_ceiling(retries: u32, ceiling: Duration) -> Duration {
    let secs = 1u64
        .checked_shl(retries)
        .map(|pow| (pow - 1) / 2)
        .unwrap_or(u64::MAX);
    std::cmp::min(Duration::from_secs(secs), ceiling)
}

#[derive(Debug, Clone, PartialEq)]
pub enum RetryDecision {
    Retry(Duration),
    DontRetry,
}

/// When and how long to back off after a 429.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retries (None = infinite)
    pub max_retries: Option<u32>,
    pub ceiling: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: None,
            ceiling: BACKOFF_CEILING,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.max_retries = Some(max);
        self
    }

    #[must_use]
    pub fn with_ceiling(mut self, ceiling: Duration) -> Self {
        self.ceiling = ceiling;
        self
    }

    /// Decide what to do after a request answered 429 with `retries`
    /// previous retries.
    pub fn on_rate_limited(&self, retries: u32) -> RetryDecision {
        if let Some(max) = self.max_retries {
            if retries >= max {
                return RetryDecision::DontRetry;
            }
        }
        RetryDecision::Retry(backoff_delay_with_ceiling(retries, self.ceiling))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_table() {
        let expected = [0, 0, 1, 3, 7, 15, 30, 30];
        for (retries, secs) in expected.iter().enumerate() {
            assert_eq!(
                backoff_delay(retries as u32),
                Duration::from_secs(*secs),
                "retries={}",
                retries
            );
        }
    }

    #[test]
    fn test_backoff_is_non_decreasing() {
        let mut last = Duration::ZERO;
        for retries in 0..80 {
            let delay = backoff_delay(retries);
            assert!(delay >= last, "retries={}", retries);
            assert!(delay <= BACKOFF_CEILING);
            last = delay;
        }
    }

    #[test]
    fn test_huge_retry_count_is_clamped() {
        assert_eq!(backoff_delay(u32::MAX), BACKOFF_CEILING);
    }

    #[test]
    fn test_custom_ceiling() {
        let ceiling = Duration::from_secs(2);
        assert_eq!(backoff_delay_with_ceiling(3, ceiling), ceiling);
        assert_eq!(backoff_delay_with_ceiling(2, ceiling), Duration::from_secs(1));
    }

    #[test]
    fn test_unbounded_policy_always_retries() {
        let policy = RetryPolicy::new();
        assert_eq!(policy.on_rate_limited(0), RetryDecision::Retry(Duration::ZERO));
        assert_eq!(policy.on_rate_limited(1000), RetryDecision::Retry(BACKOFF_CEILING));
    }

    #[test]
    fn test_capped_policy() {
        let policy = RetryPolicy::new().with_max_retries(2);
        assert!(matches!(policy.on_rate_limited(0), RetryDecision::Retry(_)));
        assert!(matches!(policy.on_rate_limited(1), RetryDecision::Retry(_)));
        assert_eq!(policy.on_rate_limited(2), RetryDecision::DontRetry);
    }

    #[test]
    fn test_zero_retry_policy() {
        let policy = RetryPolicy::new().with_max_retries(0);
        assert_eq!(policy.on_rate_limited(0), RetryDecision::DontRetry);
    }
}

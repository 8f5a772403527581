//! Retry policy for transport failures.

use std::time::Duration;

use rand::Rng;

use crate::error::GraphqlClientError;

/// Retry decision result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after a delay.
    RetryAfter(Duration),
    /// Do not retry.
    DoNotRetry,
}

/// Which requests may be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStrategy {
    /// Never retry.
    Never,
    /// Retry queries only; mutations are sent once.
    IdempotentOnly,
    /// Retry every request.
    Always,
}

/// Retry policy configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    pub max_attempts: usize,
    /// Base delay for exponential backoff.
    pub base_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Maximum jitter added to each delay.
    pub max_jitter: Duration,
    pub strategy: RetryStrategy,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            max_jitter: Duration::from_millis(150),
            strategy: RetryStrategy::IdempotentOnly,
        }
    }
}

impl RetryPolicy {
    /// Policy that sends every request exactly once.
    #[must_use]
    pub fn never() -> Self {
        Self {
            max_attempts: 1,
            strategy: RetryStrategy::Never,
            ..Self::default()
        }
    }

    /// Set the attempt budget.
    #[must_use]
    pub const fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the backoff bounds and disable jitter when `jitter` is zero.
    #[must_use]
    pub const fn with_backoff(mut self, base: Duration, max: Duration, jitter: Duration) -> Self {
        self.base_delay = base;
        self.max_delay = max;
        self.max_jitter = jitter;
        self
    }

    /// Decide whether to retry after `attempt` failed with `error`.
    #[must_use]
    pub fn decide(
        &self,
        error: &GraphqlClientError,
        attempt: usize,
        idempotent: bool,
    ) -> RetryDecision {
        if attempt >= self.max_attempts || !error.is_retryable() {
            return RetryDecision::DoNotRetry;
        }

        match self.strategy {
            RetryStrategy::Never => RetryDecision::DoNotRetry,
            RetryStrategy::IdempotentOnly if !idempotent => RetryDecision::DoNotRetry,
            RetryStrategy::IdempotentOnly | RetryStrategy::Always => {
                RetryDecision::RetryAfter(self.backoff(attempt))
            }
        }
    }

    fn backoff(&self, attempt: usize) -> Duration {
        let base_ms = u64::try_from(self.base_delay.as_millis()).unwrap_or(u64::MAX);
        let exp =
            2_u64.saturating_pow(u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX));
        let max_ms = u64::try_from(self.max_delay.as_millis()).unwrap_or(u64::MAX);
        let delay_ms = base_ms.saturating_mul(exp).min(max_ms);

        let jitter_max = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);
        let jitter_ms = if jitter_max > 0 {
            rand::thread_rng().gen_range(0..=jitter_max)
        } else {
            0
        };
        Duration::from_millis(delay_ms.saturating_add(jitter_ms))
    }
}

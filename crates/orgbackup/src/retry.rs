//! Retry policy for repository backups.
//!
//! A failed repository attempt is discarded and the whole unit restarts from
//! its existence check after a fixed delay. By default there is no attempt
//! limit: a persistently failing repository holds the session until the
//! upstream problem resolves or an operator interrupts the run. Callers that
//! need bounded sessions (and tests) set [`RetryPolicy::with_max_attempts`].

use std::time::Duration;

use backon::ConstantBuilder;

/// Default delay between repository attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Configuration for retrying a unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Fixed delay between attempts.
    pub delay: Duration,
    /// Maximum number of attempts, including the first. `None` is unbounded.
    pub max_attempts: Option<usize>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: DEFAULT_RETRY_DELAY,
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    /// Create an unbounded policy with a fixed delay.
    #[must_use]
    pub fn fixed(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    /// Limit the number of attempts. Values below 1 are treated as 1.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = Some(max_attempts.max(1));
        self
    }

    /// Number of retries after the first attempt.
    #[must_use]
    pub fn max_retries(&self) -> usize {
        self.max_attempts
            .map(|attempts| attempts.saturating_sub(1))
            .unwrap_or(usize::MAX)
    }

    /// Build the constant backoff strategy for this policy.
    #[must_use]
    pub fn into_backoff(self) -> ConstantBuilder {
        ConstantBuilder::default()
            .with_delay(self.delay)
            .with_max_times(self.max_retries())
    }
}

//! Bounded retry for portal requests.
//!
//! The portal backend is flaky in ways that do not follow status-code
//! semantics, so every failed attempt is treated alike: the request is issued
//! again immediately until the attempt bound is reached.
//!
//! # Example
//!
//! ```
//! use lms_mirror::{RetryDecision, RetryPolicy};
//!
//! let policy = RetryPolicy::with_max_attempts(5);
//! assert_eq!(policy.should_retry(1), RetryDecision::Retry { attempt: 2 });
//! assert!(matches!(policy.should_retry(5), RetryDecision::DoNotRetry { .. }));
//! ```

use tracing::{debug, instrument};

use crate::config::DEFAULT_MAX_ATTEMPTS;

/// Decision on whether to issue another attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Issue another request right away.
    Retry {
        /// Which attempt number this will be (1-indexed, so first retry is attempt 2).
        attempt: u32,
    },

    /// Stop and surface the failure.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Retry bound for a single logical request.
///
/// `max_attempts` counts every request, including the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with a custom bound (must be >= 1; lower values are raised to 1).
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Determines whether to retry after `attempt` (1-indexed) has failed.
    #[instrument(level = "trace", skip(self), fields(max_attempts = self.max_attempts))]
    pub fn should_retry(&self, attempt: u32) -> RetryDecision {
        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        RetryDecision::Retry {
            attempt: attempt + 1,
        }
    }
}

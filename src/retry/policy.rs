//! Retry policy types and configuration.

use std::time::Duration;

use crate::error::Error;

/// Number of retries used by [`RetryPolicy::default`] and the constructors.
pub const DEFAULT_RETRY_COUNT: u32 = 3;

/// Base delay used by [`RetryPolicy::default`].
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// A retry policy describing how long to wait before each retry.
///
/// Policies are pure data. [`RetryPolicy::delay`] maps a 1-based attempt
/// number to a duration; the operators in [`crate::retry`] decide when to
/// ask for it.
///
/// # Bounds Behavior
///
/// The computed delay is unbounded unless [`RetryPolicy::with_max_delay`] is
/// set. The number of retries is always bounded by `max_retries`, which
/// defaults to [`DEFAULT_RETRY_COUNT`].
///
/// # Examples
///
/// ```rust
/// use tideline::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::exponential(Duration::from_secs(2))
///     .with_max_retries(5);
///
/// assert_eq!(policy.max_retries(), 5);
/// assert_eq!(policy.delay(3), Duration::from_secs(8));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetryPolicy {
    strategy: RetryStrategy,
    max_retries: u32,
    max_delay: Option<Duration>,
}

/// The backoff strategy for retry delays.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RetryStrategy {
    /// Fixed delay between attempts.
    Constant(Duration),
    /// Delay grows linearly: base * attempt.
    Linear {
        /// Base delay duration.
        base: Duration,
    },
    /// Delay grows as a power of the base: floor(base_secs ^ attempt) seconds.
    Exponential {
        /// Base delay duration.
        base: Duration,
    },
}

/// Information about a failed attempt, passed to retry hooks.
#[derive(Debug, Clone)]
pub struct RetryAttempt<'a> {
    /// The error observed on the failed attempt.
    pub error: &'a Error,
    /// Which retry this failure would trigger (1-indexed).
    pub attempt: u32,
    /// Delay before the next attempt, or `None` if the error is re-raised.
    pub next_delay: Option<Duration>,
    /// Total elapsed time since the first attempt.
    pub elapsed: Duration,
}

impl RetryAttempt<'_> {
    /// Returns true if the operator is going to re-subscribe.
    pub fn will_retry(&self) -> bool {
        self.next_delay.is_some()
    }
}

impl RetryPolicy {
    /// Create a policy with constant delay between retries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tideline::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::constant(Duration::from_secs(2));
    ///
    /// // Every retry waits 2s
    /// assert_eq!(policy.delay(1), Duration::from_secs(2));
    /// assert_eq!(policy.delay(2), Duration::from_secs(2));
    /// assert_eq!(policy.delay(3), Duration::from_secs(2));
    /// ```
    pub fn constant(delay: Duration) -> Self {
        Self::with_strategy(RetryStrategy::Constant(delay))
    }

    /// Create a policy with linearly increasing delay.
    ///
    /// Delay = base * attempt
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tideline::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::linear(Duration::from_millis(100));
    ///
    /// // Delay increases: 100ms, 200ms, 300ms
    /// assert_eq!(policy.delay(1), Duration::from_millis(100));
    /// assert_eq!(policy.delay(2), Duration::from_millis(200));
    /// assert_eq!(policy.delay(3), Duration::from_millis(300));
    /// ```
    pub fn linear(base: Duration) -> Self {
        Self::with_strategy(RetryStrategy::Linear { base })
    }

    /// Create a policy with exponentially increasing delay.
    ///
    /// Delay = floor(base_secs ^ attempt) seconds. The power is taken on the
    /// base expressed in seconds and truncated to whole seconds, so a base
    /// below one second decays to zero instead of growing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tideline::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::exponential(Duration::from_secs(2));
    ///
    /// // Delay: 2s, 4s, 8s
    /// assert_eq!(policy.delay(1), Duration::from_secs(2));
    /// assert_eq!(policy.delay(2), Duration::from_secs(4));
    /// assert_eq!(policy.delay(3), Duration::from_secs(8));
    /// ```
    pub fn exponential(base: Duration) -> Self {
        Self::with_strategy(RetryStrategy::Exponential { base })
    }

    fn with_strategy(strategy: RetryStrategy) -> Self {
        Self {
            strategy,
            max_retries: DEFAULT_RETRY_COUNT,
            max_delay: None,
        }
    }

    /// Set the maximum number of retry attempts.
    ///
    /// This does not include the initial attempt. For example, `max_retries(3)`
    /// means up to 4 total attempts (1 initial + 3 retries).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tideline::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::exponential(Duration::from_secs(1))
    ///     .with_max_retries(3);
    ///
    /// assert_eq!(policy.max_retries(), 3);
    /// ```
    pub fn with_max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Set the maximum delay cap.
    ///
    /// Delays will never exceed this value, regardless of the backoff strategy.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tideline::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::exponential(Duration::from_secs(2))
    ///     .with_max_retries(10)
    ///     .with_max_delay(Duration::from_secs(5));
    ///
    /// assert_eq!(policy.delay(2), Duration::from_secs(4));
    /// assert_eq!(policy.delay(3), Duration::from_secs(5));
    /// ```
    pub fn with_max_delay(mut self, d: Duration) -> Self {
        self.max_delay = Some(d);
        self
    }

    /// Get the maximum number of retries.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Get the maximum delay cap.
    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }

    /// Get the retry strategy.
    pub fn strategy(&self) -> &RetryStrategy {
        &self.strategy
    }

    /// Calculate the delay before retry `attempt` (1-indexed).
    ///
    /// Attempt 0 is not a retry and yields `Duration::ZERO`. Arithmetic
    /// saturates instead of overflowing.
    pub fn delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let base_delay = match &self.strategy {
            RetryStrategy::Constant(d) => *d,
            RetryStrategy::Linear { base } => base.saturating_mul(attempt),
            RetryStrategy::Exponential { base } => exponential_secs(*base, attempt),
        };

        match self.max_delay {
            Some(max) => base_delay.min(max),
            None => base_delay,
        }
    }

    /// Calculate the delay before retry `attempt` (1-indexed).
    ///
    /// Returns None if `attempt` is 0 or exceeds `max_retries`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tideline::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::constant(Duration::from_secs(1))
    ///     .with_max_retries(2);
    ///
    /// assert_eq!(policy.delay_for_attempt(1), Some(Duration::from_secs(1)));
    /// assert_eq!(policy.delay_for_attempt(2), Some(Duration::from_secs(1)));
    /// assert_eq!(policy.delay_for_attempt(3), None); // exceeded max_retries
    /// ```
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_retries {
            return None;
        }
        Some(self.delay(attempt))
    }

    /// Decide whether `error`, seen as retry number `attempt`, is retried.
    ///
    /// Non-retryable errors never get a delay, regardless of the budget left.
    pub fn retry_delay(&self, error: &Error, attempt: u32) -> Option<Duration> {
        if !error.is_retryable() {
            return None;
        }
        self.delay_for_attempt(attempt)
    }
}

impl Default for RetryPolicy {
    /// Exponential backoff from [`DEFAULT_RETRY_DELAY`] with
    /// [`DEFAULT_RETRY_COUNT`] retries.
    fn default() -> Self {
        Self::exponential(DEFAULT_RETRY_DELAY)
    }
}

/// floor(base_secs ^ attempt) as whole seconds.
fn exponential_secs(base: Duration, attempt: u32) -> Duration {
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    let secs = base.as_secs_f64().powi(exponent).floor();
    // `as` saturates: infinity maps to u64::MAX.
    Duration::from_secs(secs as u64)
}

#[cfg(test)]
mod policy_tests {
    use super::*;

    #[test]
    fn test_constant_delay() {
        let policy = RetryPolicy::constant(Duration::from_secs(2));

        assert_eq!(policy.delay(1), Duration::from_secs(2));
        assert_eq!(policy.delay(2), Duration::from_secs(2));
        assert_eq!(policy.delay(3), Duration::from_secs(2));
    }

    #[test]
    fn test_linear_delay() {
        let policy = RetryPolicy::linear(Duration::from_millis(100));

        assert_eq!(policy.delay(1), Duration::from_millis(100));
        assert_eq!(policy.delay(2), Duration::from_millis(200));
        assert_eq!(policy.delay(3), Duration::from_millis(300));
        assert_eq!(policy.delay(4), Duration::from_millis(400));
    }

    #[test]
    fn test_exponential_delay() {
        let policy = RetryPolicy::exponential(Duration::from_secs(2));

        assert_eq!(policy.delay(1), Duration::from_secs(2));
        assert_eq!(policy.delay(2), Duration::from_secs(4));
        assert_eq!(policy.delay(3), Duration::from_secs(8));
        assert_eq!(policy.delay(4), Duration::from_secs(16));
    }

    #[test]
    fn test_exponential_truncates_to_whole_seconds() {
        let policy = RetryPolicy::exponential(Duration::from_millis(1500));

        // 1.5, 2.25, 3.375
        assert_eq!(policy.delay(1), Duration::from_secs(1));
        assert_eq!(policy.delay(2), Duration::from_secs(2));
        assert_eq!(policy.delay(3), Duration::from_secs(3));

        let sub_second = RetryPolicy::exponential(Duration::from_millis(500));
        assert_eq!(sub_second.delay(1), Duration::ZERO);
        assert_eq!(sub_second.delay(4), Duration::ZERO);
    }

    #[test]
    fn test_exponential_saturates() {
        let policy = RetryPolicy::exponential(Duration::from_secs(10));
        assert_eq!(policy.delay(u32::MAX), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_attempt_zero_is_zero() {
        assert_eq!(
            RetryPolicy::constant(Duration::from_secs(2)).delay(0),
            Duration::ZERO
        );
        assert_eq!(
            RetryPolicy::exponential(Duration::from_secs(2)).delay(0),
            Duration::ZERO
        );
    }

    #[test]
    fn test_max_delay_cap() {
        let policy = RetryPolicy::linear(Duration::from_secs(1))
            .with_max_retries(10)
            .with_max_delay(Duration::from_secs(3));

        assert_eq!(policy.delay(1), Duration::from_secs(1));
        assert_eq!(policy.delay(2), Duration::from_secs(2));
        assert_eq!(policy.delay(3), Duration::from_secs(3));
        assert_eq!(policy.delay(4), Duration::from_secs(3)); // capped
        assert_eq!(policy.delay(9), Duration::from_secs(3)); // capped
    }

    #[test]
    fn test_max_retries_limit() {
        let policy = RetryPolicy::constant(Duration::from_millis(100)).with_max_retries(2);

        assert!(policy.delay_for_attempt(0).is_none());
        assert!(policy.delay_for_attempt(1).is_some());
        assert!(policy.delay_for_attempt(2).is_some());
        assert!(policy.delay_for_attempt(3).is_none());
    }

    #[test]
    fn test_retry_delay_respects_classification() {
        let policy = RetryPolicy::constant(Duration::from_secs(1)).with_max_retries(5);

        assert_eq!(
            policy.retry_delay(&Error::response("flaky"), 1),
            Some(Duration::from_secs(1))
        );
        assert_eq!(policy.retry_delay(&Error::propagatable("fatal"), 1), None);
        assert_eq!(policy.retry_delay(&Error::unknown_host("nowhere"), 1), None);
        assert_eq!(policy.retry_delay(&Error::response("flaky"), 6), None);
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.max_retries(), DEFAULT_RETRY_COUNT);
        assert_eq!(policy.max_delay(), None);
        assert_eq!(
            policy.strategy(),
            &RetryStrategy::Exponential {
                base: DEFAULT_RETRY_DELAY
            }
        );
    }

    #[test]
    fn test_policy_is_clone() {
        let policy = RetryPolicy::exponential(Duration::from_millis(100)).with_max_retries(3);
        let cloned = policy.clone();
        assert_eq!(policy, cloned);
    }

    #[test]
    fn test_retry_attempt_will_retry() {
        let error = Error::response("x");
        let retrying = RetryAttempt {
            error: &error,
            attempt: 1,
            next_delay: Some(Duration::from_secs(1)),
            elapsed: Duration::ZERO,
        };
        let giving_up = RetryAttempt {
            next_delay: None,
            ..retrying.clone()
        };

        assert!(retrying.will_retry());
        assert!(!giving_up.will_retry());
    }
}

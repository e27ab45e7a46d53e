//! Retry and backoff for async pipelines.
//!
//! The module keeps the decision and the execution apart:
//!
//! - **Decision**: [`RetryPolicy`] is plain data. It maps an attempt number
//!   to a delay and, combined with [`Error::is_retryable`](crate::Error::is_retryable),
//!   decides whether a failure is retried at all.
//! - **Execution**: the operators re-run an operation from a factory, wait on
//!   a tokio timer between attempts and re-raise the last error when done.
//!
//! # Quick Start
//!
//! ```rust
//! use tideline::{handle_retries, Error, RetryPolicy};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let policy = RetryPolicy::exponential(Duration::from_secs(1))
//!     .with_max_retries(3);
//!
//! let value = handle_retries(|| async { Ok::<_, Error>(42) }, policy).await;
//!
//! assert_eq!(value.unwrap(), 42);
//! # });
//! ```
//!
//! # Retry Strategies
//!
//! - **Constant**: Fixed delay between retries (2s, 2s, 2s, ...)
//! - **Linear**: Delay increases linearly (2s, 4s, 6s, ...)
//! - **Exponential**: Delay is a power of the base (2s, 4s, 8s, ...)
//!
//! # Non-retryable Errors
//!
//! [`Error::Propagatable`](crate::Error::Propagatable) and
//! [`Error::UnknownHost`](crate::Error::UnknownHost) are re-raised on the
//! first occurrence, whatever the policy allows.

mod operator;
mod policy;

pub use operator::{
    handle_retries, handle_retries_if, handle_retries_stream, handle_retries_with_hooks,
};
pub use policy::{
    RetryAttempt, RetryPolicy, RetryStrategy, DEFAULT_RETRY_COUNT, DEFAULT_RETRY_DELAY,
};

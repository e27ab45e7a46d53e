//! Retry operators for futures and streams.
//!
//! Each operator takes a factory rather than a future or stream. A retry
//! means "run this operation again from scratch", so every attempt gets a
//! freshly built future or stream; nothing is resumed.

use std::future::Future;
use std::pin::Pin;

use futures::stream::{self, Stream, StreamExt};
use tokio::time::Instant;

use crate::error::{Error, Result};
use crate::retry::{RetryAttempt, RetryPolicy};

/// Retry a single-value operation using a factory function.
///
/// Retryable errors are retried up to `policy.max_retries()` times, waiting
/// `policy.delay(attempt)` on a tokio timer before each re-run. Propagatable
/// and unknown-host errors are re-raised immediately. When the budget runs
/// out the last error is returned.
///
/// # Example
///
/// ```rust
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::time::Duration;
/// use tideline::{handle_retries, Error, RetryPolicy};
///
/// # tokio_test::block_on(async {
/// let calls = AtomicU32::new(0);
/// let calls = &calls;
///
/// let result = handle_retries(
///     move || async move {
///         if calls.fetch_add(1, Ordering::SeqCst) < 2 {
///             Err(Error::response("transient"))
///         } else {
///             Ok("done")
///         }
///     },
///     RetryPolicy::constant(Duration::from_millis(1)).with_max_retries(3),
/// )
/// .await;
///
/// assert_eq!(result.unwrap(), "done");
/// assert_eq!(calls.load(Ordering::SeqCst), 3);
/// # });
/// ```
pub async fn handle_retries<T, F, Fut>(make_future: F, policy: RetryPolicy) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    run_with_retries(make_future, policy, |_| true, |_| {}).await
}

/// Retry only when `should_retry` also accepts the error.
///
/// The predicate narrows the built-in classification; it cannot make a
/// propagatable or unknown-host error retryable.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use tideline::{handle_retries_if, Error, RetryPolicy};
///
/// # tokio_test::block_on(async {
/// let result: Result<(), Error> = handle_retries_if(
///     || async { Err(Error::http(404, "Not Found")) },
///     RetryPolicy::constant(Duration::from_millis(1)),
///     |err| matches!(err, Error::Http { status, .. } if *status >= 500),
/// )
/// .await;
///
/// assert!(matches!(result, Err(Error::Http { status: 404, .. })));
/// # });
/// ```
pub async fn handle_retries_if<T, F, Fut, P>(
    make_future: F,
    policy: RetryPolicy,
    should_retry: P,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&Error) -> bool,
{
    run_with_retries(make_future, policy, should_retry, |_| {}).await
}

/// Retry with a hook for observability.
///
/// `on_retry` is called after every failed attempt, including the one that
/// is finally re-raised (its [`RetryAttempt::next_delay`] is `None`). The
/// hook is synchronous and should not block.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use tideline::{handle_retries_with_hooks, Error, RetryAttempt, RetryPolicy};
///
/// # tokio_test::block_on(async {
/// let mut seen = Vec::new();
/// let result: Result<(), Error> = handle_retries_with_hooks(
///     || async { Err(Error::response("down")) },
///     RetryPolicy::constant(Duration::from_millis(1)).with_max_retries(2),
///     |event: &RetryAttempt<'_>| seen.push((event.attempt, event.will_retry())),
/// )
/// .await;
///
/// assert!(result.is_err());
/// assert_eq!(seen, vec![(1, true), (2, true), (3, false)]);
/// # });
/// ```
pub async fn handle_retries_with_hooks<T, F, Fut, H>(
    make_future: F,
    policy: RetryPolicy,
    on_retry: H,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    H: FnMut(&RetryAttempt<'_>),
{
    run_with_retries(make_future, policy, |_| true, on_retry).await
}

async fn run_with_retries<T, F, Fut, P, H>(
    mut make_future: F,
    policy: RetryPolicy,
    should_retry: P,
    mut on_retry: H,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&Error) -> bool,
    H: FnMut(&RetryAttempt<'_>),
{
    let start = Instant::now();
    let mut attempt = 0u32;

    loop {
        let error = match make_future().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        attempt = attempt.saturating_add(1);
        let delay = if should_retry(&error) {
            policy.retry_delay(&error, attempt)
        } else {
            None
        };

        on_retry(&RetryAttempt {
            error: &error,
            attempt,
            next_delay: delay,
            elapsed: start.elapsed(),
        });

        match delay {
            Some(d) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(attempt, delay = ?d, error = %error, "retrying after failure");
                tokio::time::sleep(d).await;
            }
            None => {
                #[cfg(feature = "tracing")]
                log_give_up(&error, attempt, &policy);
                return Err(error);
            }
        }
    }
}

#[cfg(feature = "tracing")]
fn log_give_up(error: &Error, attempt: u32, policy: &RetryPolicy) {
    if error.is_retryable() && attempt > policy.max_retries() {
        tracing::warn!(
            retries = policy.max_retries(),
            error = %error,
            "retries exhausted"
        );
    } else {
        tracing::debug!(attempt, error = %error, "error is not retried");
    }
}

struct RetryStreamState<F, S> {
    make_stream: F,
    policy: RetryPolicy,
    current: Option<Pin<Box<S>>>,
    attempt: u32,
    done: bool,
}

/// Retry a multi-value stream using a factory function.
///
/// Items are forwarded as they arrive. When the stream yields an `Err`, the
/// error is classified as in [`handle_retries`]: a retryable error within
/// budget drops the current stream, waits, and subscribes to a fresh one
/// from the factory. Otherwise the error is forwarded and the stream ends.
/// The attempt counter spans the whole subscription and is not reset by
/// successful items.
///
/// # Example
///
/// ```rust
/// use futures::{stream, StreamExt};
/// use std::time::Duration;
/// use tideline::{handle_retries_stream, Error, RetryPolicy};
///
/// # tokio_test::block_on(async {
/// let mut subscriptions = 0;
/// let items: Vec<_> = handle_retries_stream(
///     || {
///         subscriptions += 1;
///         let tail = if subscriptions < 2 {
///             Err(Error::response("dropped"))
///         } else {
///             Ok(2)
///         };
///         stream::iter(vec![Ok(1), tail])
///     },
///     RetryPolicy::constant(Duration::from_millis(1)),
/// )
/// .collect()
/// .await;
///
/// let values: Vec<i32> = items.into_iter().map(Result::unwrap).collect();
/// assert_eq!(values, vec![1, 1, 2]);
/// # });
/// ```
pub fn handle_retries_stream<T, F, S>(
    make_stream: F,
    policy: RetryPolicy,
) -> impl Stream<Item = Result<T>>
where
    F: FnMut() -> S,
    S: Stream<Item = Result<T>>,
{
    let state = RetryStreamState {
        make_stream,
        policy,
        current: None,
        attempt: 0,
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        if state.done {
            return None;
        }

        loop {
            let make_stream = &mut state.make_stream;
            let current = state
                .current
                .get_or_insert_with(|| Box::pin(make_stream()));

            let error = match current.next().await {
                Some(Ok(item)) => return Some((Ok(item), state)),
                Some(Err(error)) => error,
                None => return None,
            };

            state.current = None;
            state.attempt = state.attempt.saturating_add(1);

            match state.policy.retry_delay(&error, state.attempt) {
                Some(d) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        attempt = state.attempt,
                        delay = ?d,
                        error = %error,
                        "resubscribing after stream failure"
                    );
                    tokio::time::sleep(d).await;
                }
                None => {
                    #[cfg(feature = "tracing")]
                    log_give_up(&error, state.attempt, &state.policy);
                    state.done = true;
                    return Some((Err(error), state));
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_handle_retries_success_first_time() {
        let mut calls = 0;
        let result = handle_retries(
            || {
                calls += 1;
                async { Ok::<_, Error>(42) }
            },
            RetryPolicy::constant(Duration::from_secs(1)),
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_retries_exhausted() {
        let mut calls = 0;
        let result: Result<i32> = handle_retries(
            || {
                calls += 1;
                async { Err(Error::response("error")) }
            },
            RetryPolicy::constant(Duration::from_secs(1)).with_max_retries(2),
        )
        .await;

        assert!(matches!(result, Err(Error::Response { .. })));
        assert_eq!(calls, 3); // 1 initial + 2 retries
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_retries_if_non_retryable() {
        let mut calls = 0;
        let result: Result<()> = handle_retries_if(
            || {
                calls += 1;
                async { Err(Error::http(400, "Bad Request")) }
            },
            RetryPolicy::constant(Duration::from_secs(1)),
            |err| !matches!(err, Error::Http { status: 400..=499, .. }),
        )
        .await;

        assert!(matches!(result, Err(Error::Http { status: 400, .. })));
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_retries_if_cannot_widen_classification() {
        let mut calls = 0;
        let result: Result<()> = handle_retries_if(
            || {
                calls += 1;
                async { Err(Error::propagatable("fatal")) }
            },
            RetryPolicy::constant(Duration::from_secs(1)),
            |_| true,
        )
        .await;

        assert!(matches!(result, Err(Error::Propagatable(_))));
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_stops_on_non_retryable() {
        let mut subscriptions = 0;
        let items: Vec<_> = handle_retries_stream(
            || {
                subscriptions += 1;
                stream::iter(vec![Ok(1), Err(Error::unknown_host("gone.invalid")), Ok(2)])
            },
            RetryPolicy::constant(Duration::from_secs(1)),
        )
        .collect()
        .await;

        assert_eq!(subscriptions, 1);
        assert_eq!(items.len(), 2);
        assert!(matches!(items[1], Err(Error::UnknownHost { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_completes_without_retry() {
        let items: Vec<_> = handle_retries_stream(
            || stream::iter(vec![Ok::<_, Error>(1), Ok(2)]),
            RetryPolicy::default(),
        )
        .collect()
        .await;

        assert_eq!(items.len(), 2);
    }

    #[cfg(feature = "tracing")]
    mod tracing_tests {
        use super::*;
        use tracing_test::traced_test;

        #[tokio::test(start_paused = true)]
        #[traced_test]
        async fn test_exhaustion_is_logged() {
            let _: Result<()> = handle_retries(
                || async { Err(Error::response("down")) },
                RetryPolicy::constant(Duration::from_secs(1)).with_max_retries(1),
            )
            .await;

            assert!(logs_contain("retrying after failure"));
            assert!(logs_contain("retries exhausted"));
        }
    }
}

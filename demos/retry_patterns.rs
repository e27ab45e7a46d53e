//! Retry Patterns Example
//!
//! Demonstrates retrying pipelines that talk to a flaky remote service:
//! - Basic retry of a single-value operation
//! - Comparing backoff strategies
//! - Errors that are never retried
//! - Observing attempts with hooks
//! - Resubscribing to a stream of responses
//!
//! Run with: cargo run --example retry_patterns

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use futures::{stream, StreamExt};
use tideline::prelude::*;
use tideline::testing::StaticNetworkState;

// ==================== Basic Retry ====================

/// Example 1: Basic retry with a constant delay
async fn example_basic_retry() {
    println!("\n=== Example 1: Basic Retry ===");

    let attempts = AtomicU32::new(0);

    let result = handle_retries(
        || async {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            println!("  Attempt {}", n + 1);
            if n < 2 {
                Response::failure_message("transient failure")
            } else {
                Response::success("payload")
            }
        }
        .result_or_error(),
        RetryPolicy::constant(Duration::from_millis(100)).with_max_retries(5),
    )
    .await;

    match result {
        Ok(value) => println!("Success after {} attempts: {}", attempts.into_inner(), value),
        Err(error) => println!("Failed: {}", error),
    }
}

// ==================== Backoff Strategies ====================

/// Example 2: Comparing backoff strategies
async fn example_backoff_strategies() {
    println!("\n=== Example 2: Backoff Strategies ===");

    let policies = [
        ("Constant", RetryPolicy::constant(Duration::from_secs(2))),
        ("Linear", RetryPolicy::linear(Duration::from_secs(2))),
        ("Exponential", RetryPolicy::exponential(Duration::from_secs(2))),
        (
            "Exponential (capped)",
            RetryPolicy::exponential(Duration::from_secs(2))
                .with_max_retries(6)
                .with_max_delay(Duration::from_secs(10)),
        ),
    ];

    for (name, policy) in policies {
        let delays: Vec<_> = (1..=policy.max_retries())
            .filter_map(|attempt| policy.delay_for_attempt(attempt))
            .collect();
        println!("{} delays: {:?}", name, delays);
    }
}

// ==================== Non-retryable Errors ====================

/// Example 3: Errors that bypass retrying
async fn example_non_retryable() {
    println!("\n=== Example 3: Non-retryable Errors ===");

    let errors: [fn() -> Error; 2] = [
        || Error::propagatable("session expired"),
        || Error::unknown_host("api.invalid"),
    ];

    for error in errors {
        let attempts = AtomicU32::new(0);
        let result: Result<()> = handle_retries(
            || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async move { Err(error()) }
            },
            RetryPolicy::constant(Duration::from_millis(100)).with_max_retries(5),
        )
        .await;

        println!(
            "  {:?} after {} attempt(s)",
            result.map_err(|e| e.to_string()),
            attempts.into_inner()
        );
    }
}

// ==================== Hooks ====================

/// Example 4: Observing each failed attempt
async fn example_hooks() {
    println!("\n=== Example 4: Retry Hooks ===");

    let attempts = AtomicU32::new(0);

    let _ = handle_retries_with_hooks(
        || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(Error::http(503, "Service Unavailable")) }
        },
        RetryPolicy::linear(Duration::from_millis(50)).with_max_retries(3),
        |attempt: &RetryAttempt<'_>| {
            println!(
                "  attempt {} failed with '{}', next delay {:?}, elapsed {:?}",
                attempt.attempt, attempt.error, attempt.next_delay, attempt.elapsed
            );
        },
    )
    .await;
}

// ==================== Streams ====================

/// Example 5: Gated stream that is rebuilt after a dropped connection
async fn example_stream_retry() {
    println!("\n=== Example 5: Stream Retry ===");

    let network = StaticNetworkState::new(true);
    let subscriptions = AtomicU32::new(0);

    let pages: Vec<_> = network
        .if_network_available_stream(|| {
            handle_retries_stream(
                || {
                    let n = subscriptions.fetch_add(1, Ordering::SeqCst);
                    println!("  Subscription {}", n + 1);
                    let mut pages = vec![Response::success(1), Response::success(2)];
                    if n == 0 {
                        pages.push(Response::failure_message("connection reset"));
                    } else {
                        pages.push(Response::success(3));
                    }
                    stream::iter(pages).result_or_error()
                },
                RetryPolicy::constant(Duration::from_millis(100)),
            )
        })
        .collect()
        .await;

    println!("Received: {:?}", pages);
}

#[tokio::main]
async fn main() {
    println!("Retry Patterns Examples");
    println!("=======================");

    example_basic_retry().await;
    example_backoff_strategies().await;
    example_non_retryable().await;
    example_hooks().await;
    example_stream_retry().await;

    println!("\n=== All examples completed successfully! ===");
}

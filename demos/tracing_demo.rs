//! Demonstrates the tracing output of retries, gating and monitoring
//!
//! Run with: cargo run --example tracing_demo --features tracing

use std::sync::Arc;
use std::time::Duration;

use tideline::prelude::*;
use tideline::testing::{FlakyOperation, RecordingConnectivity};
use tideline::NetworkMonitor;

#[tokio::main]
async fn main() {
    // Set up tracing subscriber
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    tracing::info!("Starting tracing demo");

    let platform = Arc::new(RecordingConnectivity::new(true, false));
    let monitor = NetworkMonitor::new(platform.clone());
    if let Err(error) = monitor.enable() {
        tracing::error!("Could not enable monitor: {}", error);
        return;
    }

    // Retries are logged at debug, exhaustion at warn
    let backend = FlakyOperation::new(2);
    let result = monitor
        .if_network_available(|| {
            handle_retries(
                || backend.call(),
                RetryPolicy::linear(Duration::from_millis(50)),
            )
        })
        .await;
    tracing::info!("First fetch: {:?}", result);

    // Platform notifications are logged at trace
    monitor.on_lost();

    // The gate short-circuit is logged at debug
    let result = monitor
        .if_network_available(|| backend.call())
        .await;
    tracing::info!("Second fetch: {:?}", result);

    if let Err(error) = monitor.disable() {
        tracing::error!("Could not disable monitor: {}", error);
    }
}

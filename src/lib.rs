//! # Tideline
//!
//! Response propagation, backoff retries and network-aware gating for async
//! pipelines built on `futures` and `tokio`.
//!
//! The crate is split along the same line as any pipeline that talks to a
//! remote service:
//! - **Data**: [`Response`] carries a result or an error across async
//!   boundaries, [`RetryPolicy`] describes how long to wait before each retry.
//!   Both are plain values.
//! - **Flow**: extension traits and operators ([`ResponseStreamExt`],
//!   [`handle_retries`], [`NetworkGateExt`]) compose those values onto
//!   streams and futures.
//!
//! ## Quick Example
//!
//! ```rust
//! use std::time::Duration;
//! use tideline::prelude::*;
//!
//! # tokio_test::block_on(async {
//! let policy = RetryPolicy::constant(Duration::from_millis(1)).with_max_retries(2);
//!
//! let value = handle_retries(
//!     || async { Response::success(42).into_result() },
//!     policy,
//! )
//! .await;
//!
//! assert_eq!(value.unwrap(), 42);
//! # });
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod http;
pub mod network;
pub mod response;
pub mod retry;
pub mod schedulers;
pub mod testing;

// Re-exports
pub use error::{Error, Result};
pub use http::{Call, CallExt, HttpResponse};
pub use network::{
    CallbackId, CallbackRegistry, ConnectivityManager, NetCapabilities, NetState, NetworkCallback,
    NetworkEvent, NetworkGateExt, NetworkMonitor, NetworkStateProvider, PlatformCapabilities,
    TransportType,
};
pub use response::{
    IntoResponse, IsEmpty, Response, ResponseFutureExt, ResponseStreamExt, NULL_RESPONSE_MESSAGE,
};
pub use retry::{
    handle_retries, handle_retries_if, handle_retries_stream, handle_retries_with_hooks,
    RetryAttempt, RetryPolicy, RetryStrategy,
};
pub use schedulers::{
    CurrentSchedulerProvider, DefaultSchedulerProvider, SchedulerProvider, SubscribeOnExt,
    TestSchedulerProvider,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::http::{Call, CallExt, HttpResponse};
    pub use crate::network::{NetworkGateExt, NetworkStateProvider};
    pub use crate::response::{IntoResponse, Response, ResponseFutureExt, ResponseStreamExt};
    pub use crate::retry::{
        handle_retries, handle_retries_if, handle_retries_stream, handle_retries_with_hooks,
        RetryAttempt, RetryPolicy,
    };
    pub use crate::schedulers::{SchedulerProvider, SubscribeOnExt};
}

//! Testing utilities for tideline pipelines.
//!
//! Test doubles for the network boundary, an operation that fails on demand
//! and assertion macros for [`Response`](crate::Response).
//!
//! # Examples
//!
//! ## Flaky Operations
//!
//! ```rust
//! use std::time::Duration;
//! use tideline::testing::FlakyOperation;
//! use tideline::{handle_retries, RetryPolicy};
//!
//! # tokio_test::block_on(async {
//! let operation = FlakyOperation::new(2);
//! let policy = RetryPolicy::constant(Duration::from_millis(1)).with_max_retries(3);
//!
//! let call = handle_retries(|| operation.call(), policy).await;
//!
//! assert_eq!(call.unwrap(), 3);
//! assert_eq!(operation.calls(), 3);
//! # });
//! ```
//!
//! ## Assertion Macros
//!
//! ```rust
//! use tideline::{assert_erroneous, assert_has_result, Error, Response};
//!
//! assert_has_result!(Response::success(42));
//! assert_erroneous!(Response::<i32>::failure(Error::response("boom")));
//! ```

use std::future::{self, Ready};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{Error, Result};
use crate::network::{
    ConnectivityManager, NetCapabilities, NetState, NetworkCallback, NetworkStateProvider,
    TransportType,
};

/// Assert that a response carries a result and no error.
///
/// # Example
///
/// ```rust
/// use tideline::{assert_has_result, Response};
///
/// assert_has_result!(Response::success("ok"));
/// ```
#[macro_export]
macro_rules! assert_has_result {
    ($response:expr) => {
        match $response.into_parts() {
            (Some(_), None) => {}
            (result, error) => {
                panic!(
                    "Expected a result, got result {:?} with error {:?}",
                    result, error
                );
            }
        }
    };
}

/// Assert that a response carries an error.
///
/// # Example
///
/// ```rust
/// use tideline::{assert_erroneous, Error, Response};
///
/// assert_erroneous!(Response::<()>::failure(Error::NetworkUnavailable));
/// ```
#[macro_export]
macro_rules! assert_erroneous {
    ($response:expr) => {
        match $response.into_parts() {
            (_, Some(_)) => {}
            (result, None) => {
                panic!("Expected an error, got result {:?}", result);
            }
        }
    };
}

/// A [`NetworkStateProvider`] whose answer is set by the test.
#[derive(Debug, Default)]
pub struct StaticNetworkState {
    available: AtomicBool,
}

impl StaticNetworkState {
    /// Create a provider reporting `available`.
    pub fn new(available: bool) -> Self {
        Self {
            available: AtomicBool::new(available),
        }
    }

    /// Change the reported availability.
    pub fn set(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

impl NetworkStateProvider for StaticNetworkState {
    fn is_network_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}

/// An operation that fails a fixed number of times before succeeding.
///
/// Each call returns the one-based call number on success. Clones share the
/// call counter.
#[derive(Debug, Clone)]
pub struct FlakyOperation {
    failures: u32,
    calls: Arc<AtomicU32>,
    make_error: fn() -> Error,
}

impl FlakyOperation {
    /// Fail `failures` times with a retryable error, then succeed.
    pub fn new(failures: u32) -> Self {
        Self {
            failures,
            calls: Arc::new(AtomicU32::new(0)),
            make_error: || Error::response("flaky operation failed"),
        }
    }

    /// Never succeed.
    pub fn always_failing() -> Self {
        Self::new(u32::MAX)
    }

    /// Fail with errors built by `make_error` instead.
    pub fn with_error(mut self, make_error: fn() -> Error) -> Self {
        self.make_error = make_error;
        self
    }

    /// Number of times the operation has been called.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Call the operation.
    pub fn call(&self) -> Ready<Result<u32>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures {
            future::ready(Err((self.make_error)()))
        } else {
            future::ready(Ok(call))
        }
    }
}

/// A [`ConnectivityManager`] that records what the monitor asks of it.
#[derive(Debug, Default)]
pub struct RecordingConnectivity {
    connected: AtomicBool,
    metered: AtomicBool,
    registrations: AtomicU32,
    unregistrations: AtomicU32,
    last_transports: Mutex<Vec<TransportType>>,
    next_registration_error: Mutex<Option<Error>>,
}

impl RecordingConnectivity {
    /// Create a platform reporting the given connectivity.
    pub fn new(connected: bool, metered: bool) -> Self {
        Self {
            connected: AtomicBool::new(connected),
            metered: AtomicBool::new(metered),
            ..Self::default()
        }
    }

    /// Change the reported connectivity.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Change the reported metering.
    pub fn set_metered(&self, metered: bool) {
        self.metered.store(metered, Ordering::SeqCst);
    }

    /// Make the next registration fail with `error`.
    pub fn fail_next_registration(&self, error: Error) {
        *self
            .next_registration_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(error);
    }

    /// Number of successful registrations.
    pub fn registrations(&self) -> u32 {
        self.registrations.load(Ordering::SeqCst)
    }

    /// Number of unregistrations.
    pub fn unregistrations(&self) -> u32 {
        self.unregistrations.load(Ordering::SeqCst)
    }

    /// Transports passed to the last registration.
    pub fn last_transports(&self) -> Vec<TransportType> {
        self.last_transports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ConnectivityManager for RecordingConnectivity {
    fn register_network_callback(&self, transports: &[TransportType]) -> Result<()> {
        let pending = self
            .next_registration_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(error) = pending {
            return Err(error);
        }

        *self
            .last_transports
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = transports.to_vec();
        self.registrations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn unregister_network_callback(&self) -> Result<()> {
        self.unregistrations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_network_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn is_active_network_metered(&self) -> bool {
        self.metered.load(Ordering::SeqCst)
    }
}

/// A [`NetworkCallback`] that keeps every notification it receives.
#[derive(Debug, Default)]
pub struct RecordingCallback {
    states: Mutex<Vec<NetState>>,
    capabilities: Mutex<Vec<NetCapabilities>>,
}

impl RecordingCallback {
    /// Create a callback with nothing recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// State notifications in arrival order.
    pub fn states(&self) -> Vec<NetState> {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Capability notifications in arrival order.
    pub fn capabilities(&self) -> Vec<NetCapabilities> {
        self.capabilities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl NetworkCallback for RecordingCallback {
    fn on_network_state_changed(&self, state: &NetState) {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(*state);
    }

    fn on_network_capabilities_changed(&self, capabilities: &NetCapabilities) {
        self.capabilities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(*capabilities);
    }
}

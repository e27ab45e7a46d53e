//! Guards operations behind a network availability check.

use std::future::Future;
use std::sync::Arc;

use futures::future::{self, Either};
use futures::stream::{self, Stream};

use crate::error::{Error, Result};
use crate::response::Response;

/// Answers whether the network is currently usable.
pub trait NetworkStateProvider {
    /// Returns true if a network is available.
    fn is_network_available(&self) -> bool;
}

impl<P: NetworkStateProvider + ?Sized> NetworkStateProvider for &P {
    fn is_network_available(&self) -> bool {
        (**self).is_network_available()
    }
}

impl<P: NetworkStateProvider + ?Sized> NetworkStateProvider for Arc<P> {
    fn is_network_available(&self) -> bool {
        (**self).is_network_available()
    }
}

/// Network gating for any [`NetworkStateProvider`].
///
/// Availability is read once, when the gated pipeline is built. When the
/// network is down the operation factory is dropped without being called
/// and the pipeline fails with [`Error::NetworkUnavailable`].
///
/// # Example
///
/// ```rust
/// use tideline::testing::StaticNetworkState;
/// use tideline::{Error, NetworkGateExt};
///
/// # tokio_test::block_on(async {
/// let offline = StaticNetworkState::new(false);
///
/// let result = offline
///     .if_network_available(|| async { Ok::<_, Error>("fetched") })
///     .await;
///
/// assert!(matches!(result, Err(Error::NetworkUnavailable)));
/// # });
/// ```
pub trait NetworkGateExt: NetworkStateProvider {
    /// Report availability as a [`Response`].
    ///
    /// An unavailable network carries `false` together with
    /// [`Error::NetworkUnavailable`].
    fn network_availability(&self) -> Response<bool> {
        if self.is_network_available() {
            Response::success(true)
        } else {
            Response::new(Some(false), Some(Error::NetworkUnavailable))
        }
    }

    /// Fail with [`Error::NetworkUnavailable`] if the network is down.
    fn error_out_if_network_unavailable(&self) -> Result<()> {
        if self.is_network_available() {
            Ok(())
        } else {
            log_short_circuit();
            Err(Error::NetworkUnavailable)
        }
    }

    /// Run `operation` only if the network is available.
    fn if_network_available<F, Fut, T>(&self, operation: F) -> impl Future<Output = Result<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let gate = self.error_out_if_network_unavailable();
        async move {
            gate?;
            operation().await
        }
    }

    /// Subscribe to the stream built by `operation` only if the network is
    /// available. Otherwise the stream yields a single error.
    fn if_network_available_stream<F, S, T>(&self, operation: F) -> impl Stream<Item = Result<T>>
    where
        F: FnOnce() -> S,
        S: Stream<Item = Result<T>>,
    {
        match self.error_out_if_network_unavailable() {
            Ok(()) => Either::Left(operation()),
            Err(error) => Either::Right(stream::once(future::ready(Err(error)))),
        }
    }
}

impl<P: NetworkStateProvider + ?Sized> NetworkGateExt for P {}

fn log_short_circuit() {
    #[cfg(feature = "tracing")]
    tracing::debug!("network unavailable, skipping operation");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NETWORK_UNAVAILABLE_MESSAGE;
    use crate::testing::StaticNetworkState;
    use futures::StreamExt;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_operation_runs_when_available() {
        let online = StaticNetworkState::new(true);

        let result = online
            .if_network_available(|| async { Ok::<_, Error>(7) })
            .await;

        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_operation_never_invoked_when_unavailable() {
        let offline = StaticNetworkState::new(false);
        let calls = AtomicU32::new(0);

        let result = offline
            .if_network_available(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, Error>(7) }
            })
            .await;

        let error = result.unwrap_err();
        assert_eq!(error.to_string(), NETWORK_UNAVAILABLE_MESSAGE);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_availability_read_when_pipeline_is_built() {
        let state = StaticNetworkState::new(true);
        let gated = state.if_network_available(|| async { Ok::<_, Error>("done") });

        state.set(false);

        assert_eq!(gated.await.unwrap(), "done");
    }

    #[tokio::test]
    async fn test_stream_gate() {
        let online = StaticNetworkState::new(true);
        let offline = StaticNetworkState::new(false);
        let calls = AtomicU32::new(0);

        let items: Vec<_> = online
            .if_network_available_stream(|| stream::iter(vec![Ok::<_, Error>(1), Ok(2)]))
            .collect()
            .await;
        assert_eq!(items.into_iter().map(|item| item.unwrap()).collect::<Vec<_>>(), vec![1, 2]);

        let items: Vec<_> = offline
            .if_network_available_stream(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                stream::iter(vec![Ok::<_, Error>(1)])
            })
            .collect()
            .await;
        assert_eq!(items.len(), 1);
        assert!(items[0].as_ref().unwrap_err().is_network_unavailable());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_network_availability_response() {
        let online = StaticNetworkState::new(true).network_availability();
        assert_eq!(online.result(), Some(&true));
        assert!(!online.is_erroneous());

        let offline = StaticNetworkState::new(false).network_availability();
        assert_eq!(offline.result(), Some(&false));
        assert!(offline.error().is_some_and(Error::is_network_unavailable));
    }

    #[test]
    fn test_gate_through_shared_provider() {
        let state = Arc::new(StaticNetworkState::new(false));
        assert!(state.error_out_if_network_unavailable().is_err());

        state.set(true);
        assert!(state.error_out_if_network_unavailable().is_ok());
    }
}

//! Stream and future operators over [`Response`] values.
//!
//! Multi-value pipelines are modelled as `Stream<Item = Response<T>>`,
//! single-value pipelines as `Future<Output = Response<T>>`. The operators
//! that can fail produce `Result` items; a stream stops after forwarding its
//! first error, the same way a reactive stream terminates on its error
//! channel.

use std::future::{ready, Future};

use futures::{FutureExt, Stream, StreamExt, TryStreamExt};

use crate::error::Result;
use crate::response::{IsEmpty, Response};

/// End a stream right after its first `Err` item.
pub(crate) fn until_first_error<T, S>(stream: S) -> impl Stream<Item = Result<T>>
where
    S: Stream<Item = Result<T>>,
{
    stream.scan(false, |failed, item| {
        if *failed {
            return ready(None);
        }
        *failed = item.is_err();
        ready(Some(item))
    })
}

/// Operators for streams of [`Response`] values.
///
/// Implemented for every `Stream<Item = Response<T>>`.
///
/// # Example
///
/// ```rust
/// use futures::{stream, StreamExt};
/// use tideline::{Error, Response, ResponseStreamExt};
///
/// # tokio_test::block_on(async {
/// let responses = stream::iter(vec![
///     Response::success(1),
///     Response::success(2),
///     Response::failure(Error::response("gone")),
///     Response::success(3),
/// ]);
///
/// let items: Vec<_> = responses.result_or_error().collect().await;
/// assert_eq!(items.len(), 3);
/// assert_eq!(items[0].as_ref().unwrap(), &1);
/// assert!(items[2].is_err());
/// # });
/// ```
pub trait ResponseStreamExt<T>: Stream<Item = Response<T>> + Sized {
    /// Forward each result, or fail with the wrapped error.
    ///
    /// A response with neither a result nor an error fails with
    /// [`Error::NoResult`](crate::Error::NoResult).
    fn result_or_error(self) -> impl Stream<Item = Result<T>> {
        until_first_error(self.map(Response::into_result))
    }

    /// Forward each successful response as-is, or fail as
    /// [`ResponseStreamExt::result_or_error`] does.
    fn successful_response_or_error(self) -> impl Stream<Item = Result<Response<T>>> {
        until_first_error(self.map(Response::into_successful))
    }

    /// Keep only responses that are non-erroneous and carry a result.
    fn filter_successful(self) -> impl Stream<Item = Response<T>> {
        self.filter(|response| ready(!response.is_erroneous_or_null()))
    }

    /// Keep only responses that carry a result.
    fn with_result(self) -> impl Stream<Item = Response<T>> {
        self.filter(|response| ready(response.has_result()))
    }

    /// Keep only responses whose result is a non-empty collection.
    fn with_non_empty_result(self) -> impl Stream<Item = Response<T>>
    where
        T: IsEmpty,
    {
        self.filter(|response| ready(!response.is_empty_response()))
    }

    /// Run `action` on each result and forward it re-wrapped.
    fn also_with_result<F>(self, mut action: F) -> impl Stream<Item = Result<Response<T>>>
    where
        F: FnMut(&T),
    {
        until_first_error(self.map(move |response| {
            response.into_result().map(|value| {
                action(&value);
                Response::success(value)
            })
        }))
    }

    /// Chain an async step onto each unwrapped result.
    fn and_then_or_error<U, F, Fut>(self, f: F) -> impl Stream<Item = Result<U>>
    where
        F: FnMut(T) -> Fut,
        Fut: Future<Output = Result<U>>,
    {
        until_first_error(self.map(Response::into_result).and_then(f))
    }
}

impl<T, S> ResponseStreamExt<T> for S where S: Stream<Item = Response<T>> {}

/// Operators for futures resolving to a single [`Response`].
///
/// Filtering operators resolve to `Option`, since a filtered single value may
/// be absent.
///
/// # Example
///
/// ```rust
/// use tideline::{Response, ResponseFutureExt};
///
/// # tokio_test::block_on(async {
/// let value = async { Response::success("ok") }.result_or_error().await;
/// assert_eq!(value.unwrap(), "ok");
///
/// let missing = async { Response::<Vec<u8>>::success(vec![]) }
///     .with_non_empty_result()
///     .await;
/// assert!(missing.is_none());
/// # });
/// ```
pub trait ResponseFutureExt<T>: Future<Output = Response<T>> + Sized {
    /// Resolve to the result, or fail with the wrapped error.
    fn result_or_error(self) -> impl Future<Output = Result<T>> {
        self.map(Response::into_result)
    }

    /// Resolve to the response itself when it is successful.
    fn successful_response_or_error(self) -> impl Future<Output = Result<Response<T>>> {
        self.map(Response::into_successful)
    }

    /// Resolve to the response only if it is non-erroneous and has a result.
    fn filter_successful(self) -> impl Future<Output = Option<Response<T>>> {
        self.map(|response| (!response.is_erroneous_or_null()).then_some(response))
    }

    /// Resolve to the response only if it carries a result.
    fn with_result(self) -> impl Future<Output = Option<Response<T>>> {
        self.map(|response| response.has_result().then_some(response))
    }

    /// Resolve to the response only if its result is a non-empty collection.
    fn with_non_empty_result(self) -> impl Future<Output = Option<Response<T>>>
    where
        T: IsEmpty,
    {
        self.map(|response| (!response.is_empty_response()).then_some(response))
    }

    /// Run `action` on the result and resolve to it re-wrapped.
    fn also_with_result<F>(self, action: F) -> impl Future<Output = Result<Response<T>>>
    where
        F: FnOnce(&T),
    {
        self.map(move |response| {
            response.into_result().map(|value| {
                action(&value);
                Response::success(value)
            })
        })
    }

    /// Chain an async step onto the unwrapped result.
    fn and_then_or_error<U, F, Fut>(self, f: F) -> impl Future<Output = Result<U>>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<U>>,
    {
        async move {
            let value = self.await.into_result()?;
            f(value).await
        }
    }
}

impl<T, F> ResponseFutureExt<T> for F where F: Future<Output = Response<T>> {}

//! Adapting blocking HTTP calls into [`Response`]s.

use crate::error::{Error, Result};
use crate::response::Response;

/// Message used when a successful call carries no body.
pub const NO_BODY_MESSAGE: &str = "Received no response From the Server.";

/// The outcome of an executed HTTP call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse<T> {
    /// Status code.
    pub status: u16,
    /// Reason phrase, used as the error message for failed calls.
    pub reason: String,
    /// Decoded body, if any.
    pub body: Option<T>,
}

impl<T> HttpResponse<T> {
    /// A response with a status and body and an empty reason phrase.
    pub fn new(status: u16, body: Option<T>) -> Self {
        Self {
            status,
            reason: String::new(),
            body,
        }
    }

    /// Set the reason phrase.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Returns true for 2xx statuses.
    pub fn is_successful(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A synchronous HTTP call that can be executed once.
///
/// Any `FnOnce() -> Result<HttpResponse<T>>` is a call, so client code can
/// wrap its transport in a closure.
pub trait Call {
    /// Decoded body type.
    type Body;

    /// Execute the call, blocking until it completes.
    fn execute(self) -> Result<HttpResponse<Self::Body>>;
}

impl<F, T> Call for F
where
    F: FnOnce() -> Result<HttpResponse<T>>,
{
    type Body = T;

    fn execute(self) -> Result<HttpResponse<T>> {
        self()
    }
}

/// Turns an executed call into a [`Response`].
///
/// # Example
///
/// ```rust
/// use tideline::{CallExt, Error, HttpResponse, Response};
///
/// let call = || Ok::<_, Error>(HttpResponse::new(200, Some(vec![1, 2, 3])));
/// let response = call.execute_with(|body: Vec<u8>| Response::success(body.len()));
/// assert_eq!(response.result(), Some(&3));
///
/// let call = || Ok::<_, Error>(HttpResponse::<Vec<u8>>::new(503, None).with_reason("Service Unavailable"));
/// let response = call.execute_with(|body: Vec<u8>| Response::success(body.len()));
/// assert!(matches!(response.error(), Some(Error::Http { status: 503, .. })));
/// ```
pub trait CallExt: Call + Sized {
    /// Execute the call and hand a successful body to `handler`.
    ///
    /// - a 2xx response with a body yields `handler(body)`
    /// - a 2xx response without a body fails with [`NO_BODY_MESSAGE`]
    /// - any other status fails with [`Error::Http`]
    /// - a transport error is returned as the response error
    fn execute_with<R, H>(self, handler: H) -> Response<R>
    where
        H: FnOnce(Self::Body) -> Response<R>,
    {
        let response = match self.execute() {
            Ok(response) => response,
            Err(error) => return Response::failure(error),
        };

        if !response.is_successful() {
            #[cfg(feature = "tracing")]
            tracing::debug!(status = response.status, "http call failed");
            return Response::failure(Error::http(response.status, response.reason));
        }

        match response.body {
            Some(body) => handler(body),
            None => Response::failure_message(NO_BODY_MESSAGE),
        }
    }
}

impl<C: Call> CallExt for C {}

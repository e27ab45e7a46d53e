//! The error taxonomy shared by every pipeline stage.
//!
//! Errors are a closed set of variants. Whether an error may be retried is
//! decided by matching on the variant, see [`Error::is_retryable`].

use std::fmt;

use crate::response::Response;

/// Message used when a successful response carries no result.
pub const NO_RESULT_MESSAGE: &str = "The Response Result is null.";

/// Message used by the network gate.
pub const NETWORK_UNAVAILABLE_MESSAGE: &str =
    "The Network is unavailable. Unable to perform the action.";

/// Boxed source error carried by [`Error::Propagatable`] and [`Error::Other`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced or propagated by tideline pipelines.
///
/// # Examples
///
/// ```rust
/// use tideline::Error;
///
/// assert!(Error::response("server hiccup").is_retryable());
/// assert!(!Error::unknown_host("api.example.com").is_retryable());
/// assert!(!Error::propagatable("bad credentials").is_retryable());
/// ```
#[derive(Debug)]
pub enum Error {
    /// Success was signalled but no payload was present.
    NoResult {
        /// Description of the missing payload.
        message: String,
    },
    /// A generic wrapped failure.
    Response {
        /// Description of the failure, if one was supplied.
        message: Option<String>,
    },
    /// A failure explicitly marked to bypass retrying.
    Propagatable(BoxError),
    /// The target host could not be resolved.
    UnknownHost {
        /// The host that failed to resolve.
        host: String,
    },
    /// Raised by the network gate when connectivity is unavailable.
    NetworkUnavailable,
    /// An HTTP call completed with a non-successful status.
    Http {
        /// The HTTP status code.
        status: u16,
        /// Status line or body excerpt.
        message: String,
    },
    /// A scheduled stage was cancelled or panicked before producing a value.
    Cancelled,
    /// Any other failure.
    Other(BoxError),
}

impl Error {
    /// Create a [`Error::NoResult`] with the default message.
    pub fn no_result() -> Self {
        Self::NoResult {
            message: NO_RESULT_MESSAGE.to_string(),
        }
    }

    /// Create a [`Error::Response`] with a message.
    pub fn response(message: impl Into<String>) -> Self {
        Self::Response {
            message: Some(message.into()),
        }
    }

    /// Create a [`Error::Propagatable`] wrapping the given source.
    pub fn propagatable(source: impl Into<BoxError>) -> Self {
        Self::Propagatable(source.into())
    }

    /// Create a [`Error::UnknownHost`].
    pub fn unknown_host(host: impl Into<String>) -> Self {
        Self::UnknownHost { host: host.into() }
    }

    /// Create a [`Error::Http`].
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Wrap an arbitrary error as [`Error::Other`].
    pub fn other(source: impl Into<BoxError>) -> Self {
        Self::Other(source.into())
    }

    /// Returns true if a retry operator may re-subscribe after this error.
    ///
    /// Propagatable and unknown-host errors always terminate the pipeline.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Propagatable(_) | Self::UnknownHost { .. })
    }

    /// Returns true if this error was raised by the network gate.
    pub fn is_network_unavailable(&self) -> bool {
        matches!(self, Self::NetworkUnavailable)
    }

    /// Wrap this error as a failed [`Response`].
    ///
    /// Takes precedence over [`IntoResponse`](crate::IntoResponse), which
    /// would wrap the error as a successful result.
    pub fn into_response<R>(self) -> Response<R> {
        Response::failure(self)
    }
}

impl Default for Error {
    /// The generic response error used when a response carries neither a
    /// result nor an error.
    fn default() -> Self {
        Self::Response { message: None }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoResult { message } => write!(f, "no result: {}", message),
            Self::Response { message: Some(m) } => write!(f, "response error: {}", m),
            Self::Response { message: None } => write!(f, "response error"),
            Self::Propagatable(e) => write!(f, "{}", e),
            Self::UnknownHost { host } => write!(f, "unable to resolve host \"{}\"", host),
            Self::NetworkUnavailable => write!(f, "{}", NETWORK_UNAVAILABLE_MESSAGE),
            Self::Http { status, message } => write!(f, "HTTP {} {}", status, message),
            Self::Cancelled => write!(f, "operation was cancelled"),
            Self::Other(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Propagatable(e) | Self::Other(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Other(Box::new(e))
    }
}

//! A result-or-error container for async pipelines.
//!
//! [`Response`] lets a pipeline stage hand a success or a failure to the next
//! stage as an ordinary value. The stream and future operators in [`ext`]
//! turn it back into a `Result` at the point where the pipeline needs one.
//!
//! # Examples
//!
//! ```rust
//! use tideline::{Error, Response};
//!
//! let ok = Response::success(vec![1, 2, 3]);
//! assert!(ok.has_result());
//! assert!(!ok.is_empty_response());
//!
//! let failed: Response<Vec<i32>> = Response::failure(Error::response("timeout"));
//! assert!(failed.is_erroneous());
//! assert!(failed.into_result().is_err());
//! ```

pub mod ext;

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use crate::error::{Error, Result};

/// Message used by [`Response::as_error_or_null_response`].
///
/// Shorter than [`crate::error::NO_RESULT_MESSAGE`], which is used everywhere
/// else a result is missing.
pub const NULL_RESPONSE_MESSAGE: &str = "Result is null.";

pub use ext::{ResponseFutureExt, ResponseStreamExt};

/// Holds an optional result and an optional error.
///
/// The two fields are not mutually exclusive. When both are present the
/// error wins: [`Response::into_result`] and every operator built on it
/// treat the response as failed.
#[derive(Debug)]
pub struct Response<R> {
    result: Option<R>,
    error: Option<Error>,
}

impl<R> Response<R> {
    /// Create a response from its raw parts.
    pub fn new(result: Option<R>, error: Option<Error>) -> Self {
        Self { result, error }
    }

    /// Create a successful response.
    pub fn success(result: R) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    /// Create a failed response.
    pub fn failure(error: Error) -> Self {
        Self {
            result: None,
            error: Some(error),
        }
    }

    /// Create a failed response carrying a generic [`Error::Response`].
    pub fn failure_message(message: impl Into<String>) -> Self {
        Self::failure(Error::response(message))
    }

    /// Create a response with neither a result nor an error.
    pub fn empty() -> Self {
        Self {
            result: None,
            error: None,
        }
    }

    /// Run an operation and capture its outcome.
    ///
    /// `Ok(Some(_))` becomes a success, `Ok(None)` an empty response and
    /// `Err(_)` a failure.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tideline::{Error, Response};
    ///
    /// let parsed = Response::catching(|| Ok("42".parse::<i32>().ok()));
    /// assert_eq!(parsed.result(), Some(&42));
    ///
    /// let failed: Response<i32> = Response::catching(|| Err(Error::response("io")));
    /// assert!(failed.is_erroneous());
    /// ```
    pub fn catching<F>(operation: F) -> Self
    where
        F: FnOnce() -> Result<Option<R>>,
    {
        match operation() {
            Ok(result) => Self::new(result, None),
            Err(error) => Self::failure(error),
        }
    }

    /// Returns true if a result is present.
    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }

    /// Returns true if an error is present.
    pub fn is_erroneous(&self) -> bool {
        self.error.is_some()
    }

    /// Returns true if the response failed or carries no result.
    pub fn is_erroneous_or_null(&self) -> bool {
        self.is_erroneous() || !self.has_result()
    }

    /// Get a reference to the result, if any.
    pub fn result(&self) -> Option<&R> {
        self.result.as_ref()
    }

    /// Get a reference to the error, if any.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Split the response into its raw parts.
    pub fn into_parts(self) -> (Option<R>, Option<Error>) {
        (self.result, self.error)
    }

    /// Apply `mapper` to the result if one is present.
    pub fn map_result<O, F>(&self, mapper: F) -> Option<O>
    where
        F: FnOnce(&R) -> O,
    {
        self.result.as_ref().map(mapper)
    }

    /// Apply `mapper` to the error if one is present.
    pub fn map_error<O, F>(&self, mapper: F) -> Option<O>
    where
        F: FnOnce(&Error) -> O,
    {
        self.error.as_ref().map(mapper)
    }

    /// Take the error, or a generic [`Error::Response`] when there is none.
    pub fn error_or_default(self) -> Error {
        self.error.unwrap_or_default()
    }

    /// Turn this response into a failure carrying [`Response::error_or_default`].
    pub fn as_error(self) -> Self {
        Self::failure(self.error_or_default())
    }

    /// Turn this response into a failure.
    ///
    /// A response with neither a result nor an error becomes
    /// [`Error::NoResult`]; anything else behaves like [`Response::as_error`].
    pub fn as_error_or_null_response(self) -> Self {
        if !self.is_erroneous() && !self.has_result() {
            Self::failure(Error::NoResult {
                message: NULL_RESPONSE_MESSAGE.to_string(),
            })
        } else {
            self.as_error()
        }
    }

    /// Unwrap the result, or fail.
    ///
    /// The wrapped error takes precedence; a response with no error and no
    /// result fails with [`Error::NoResult`].
    pub fn into_result(self) -> Result<R> {
        if let Some(error) = self.error {
            return Err(error);
        }
        self.result.ok_or_else(Error::no_result)
    }

    /// Keep the response itself when it is successful, or fail as
    /// [`Response::into_result`] does.
    pub fn into_successful(self) -> Result<Self> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if self.result.is_none() {
            return Err(Error::no_result());
        }
        Ok(self)
    }
}

impl<R: IsEmpty> Response<R> {
    /// Returns true if the result is missing or is an empty collection.
    pub fn is_empty_response(&self) -> bool {
        self.result.as_ref().map_or(true, IsEmpty::is_empty)
    }
}

impl<R> Default for Response<R> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<R> From<Error> for Response<R> {
    fn from(error: Error) -> Self {
        Self::failure(error)
    }
}

impl<R, E: Into<Error>> From<std::result::Result<R, E>> for Response<R> {
    fn from(result: std::result::Result<R, E>) -> Self {
        match result {
            Ok(value) => Self::success(value),
            Err(error) => Self::failure(error.into()),
        }
    }
}

/// Wrap any value as a successful [`Response`].
///
/// Errors have their own [`Error::into_response`], which builds a failure.
///
/// ```rust
/// use tideline::IntoResponse;
///
/// let response = "payload".into_response();
/// assert_eq!(response.result(), Some(&"payload"));
/// ```
pub trait IntoResponse: Sized {
    /// Wrap `self` as a successful response.
    fn into_response(self) -> Response<Self> {
        Response::success(self)
    }
}

impl<T> IntoResponse for T {}

/// Collections whose emptiness can be checked by [`Response::is_empty_response`].
pub trait IsEmpty {
    /// Returns true if the collection holds no elements.
    fn is_empty(&self) -> bool;
}

macro_rules! impl_is_empty {
    ($($ty:ty => [$($generics:tt)*]),* $(,)?) => {
        $(
            impl<$($generics)*> IsEmpty for $ty {
                fn is_empty(&self) -> bool {
                    <$ty>::is_empty(self)
                }
            }
        )*
    };
}

impl_is_empty! {
    Vec<T> => [T],
    VecDeque<T> => [T],
    BTreeSet<T> => [T],
    BTreeMap<K, V> => [K, V],
    HashSet<T, S> => [T, S],
    HashMap<K, V, S> => [K, V, S],
    String => [],
}

impl<T> IsEmpty for [T] {
    fn is_empty(&self) -> bool {
        <[T]>::is_empty(self)
    }
}

impl<T: IsEmpty + ?Sized> IsEmpty for &T {
    fn is_empty(&self) -> bool {
        T::is_empty(self)
    }
}

impl<T: IsEmpty + ?Sized> IsEmpty for Box<T> {
    fn is_empty(&self) -> bool {
        T::is_empty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let ok = Response::success(1);
        assert!(ok.has_result());
        assert!(!ok.is_erroneous());
        assert!(!ok.is_erroneous_or_null());

        let failed: Response<i32> = Response::failure_message("boom");
        assert!(!failed.has_result());
        assert!(failed.is_erroneous());
        assert!(failed.is_erroneous_or_null());

        let empty: Response<i32> = Response::empty();
        assert!(!empty.has_result());
        assert!(!empty.is_erroneous());
        assert!(empty.is_erroneous_or_null());
    }

    #[test]
    fn test_into_result_forwards_result_unchanged() {
        let response = Response::success("value".to_string());
        assert_eq!(response.into_result().unwrap(), "value");
    }

    #[test]
    fn test_into_result_without_result_or_error_is_no_result() {
        let response: Response<i32> = Response::empty();
        assert!(matches!(response.into_result(), Err(Error::NoResult { .. })));
    }

    #[test]
    fn test_into_result_prefers_error_over_result() {
        let response = Response::new(Some(false), Some(Error::NetworkUnavailable));
        assert!(matches!(response.into_result(), Err(Error::NetworkUnavailable)));
    }

    #[test]
    fn test_into_successful() {
        let ok = Response::success(3).into_successful().unwrap();
        assert_eq!(ok.result(), Some(&3));

        let empty: Response<i32> = Response::empty();
        assert!(matches!(empty.into_successful(), Err(Error::NoResult { .. })));
    }

    #[test]
    fn test_catching() {
        let some = Response::catching(|| Ok(Some(5)));
        assert_eq!(some.result(), Some(&5));

        let none: Response<i32> = Response::catching(|| Ok(None));
        assert!(!none.has_result());
        assert!(!none.is_erroneous());

        let err: Response<i32> = Response::catching(|| Err(Error::unknown_host("x")));
        assert!(matches!(err.error(), Some(Error::UnknownHost { .. })));
    }

    #[test]
    fn test_map_result_and_error() {
        let ok = Response::success(21);
        assert_eq!(ok.map_result(|n| n * 2), Some(42));
        assert_eq!(ok.map_error(|e| e.to_string()), None);

        let failed: Response<i32> = Response::failure_message("bad");
        assert_eq!(failed.map_result(|n| n * 2), None);
        assert_eq!(
            failed.map_error(|e| e.to_string()),
            Some("response error: bad".to_string())
        );
    }

    #[test]
    fn test_error_or_default() {
        let empty: Response<i32> = Response::empty();
        assert!(matches!(
            empty.error_or_default(),
            Error::Response { message: None }
        ));

        let failed: Response<i32> = Response::failure(Error::NetworkUnavailable);
        assert!(failed.error_or_default().is_network_unavailable());
    }

    #[test]
    fn test_as_error_discards_result() {
        let converted = Response::success(1).as_error();
        assert!(!converted.has_result());
        assert!(matches!(
            converted.error(),
            Some(Error::Response { message: None })
        ));
    }

    #[test]
    fn test_as_error_or_null_response() {
        let empty: Response<i32> = Response::empty();
        match empty.as_error_or_null_response().error() {
            Some(Error::NoResult { message }) => {
                assert_eq!(message, NULL_RESPONSE_MESSAGE);
                assert_ne!(message, crate::error::NO_RESULT_MESSAGE);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let failed: Response<i32> = Response::failure(Error::unknown_host("h"));
        assert!(matches!(
            failed.as_error_or_null_response().error(),
            Some(Error::UnknownHost { .. })
        ));
    }

    #[test]
    fn test_is_empty_response() {
        assert!(Response::success(Vec::<i32>::new()).is_empty_response());
        assert!(!Response::success(vec![1]).is_empty_response());
        assert!(Response::<Vec<i32>>::empty().is_empty_response());
        assert!(Response::success(String::new()).is_empty_response());

        let mut map = HashMap::new();
        map.insert("k", 1);
        assert!(!Response::success(map).is_empty_response());
    }

    #[test]
    fn test_conversions() {
        let ok: Response<i32> = Ok::<_, Error>(7).into();
        assert_eq!(ok.result(), Some(&7));

        let io: Response<i32> =
            Err::<i32, _>(std::io::Error::new(std::io::ErrorKind::Other, "io")).into();
        assert!(matches!(io.error(), Some(Error::Other(_))));

        let from_error: Response<i32> = Error::NetworkUnavailable.into();
        assert!(from_error.is_erroneous());

        assert_eq!(5.into_response().result(), Some(&5));
    }
}

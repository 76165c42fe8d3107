//! The request executor.
//!
//! [`safe_request`] is the single place where failures are caught. Whatever
//! an operation fails with is modelled as a [`Failure`] and normalized into an
//! [`ApiError`], so callers always receive an [`ApiResult`] and never need to
//! handle a panic or a foreign error type.

use crate::api_error::{ApiError, ErrorCode, ErrorDetails};
use crate::result::{fail, ok, ApiResult};
use crate::schema::SchemaError;
use futures_util::FutureExt;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;

const TRANSPORT_FALLBACK_MESSAGE: &str = "API request failed";
const TRANSPORT_FALLBACK_STATUS: u16 = 500;
const UNKNOWN_MESSAGE: &str = "Unknown error";

/// A status-bearing error that did not come from this crate's resolver.
///
/// Anything with a numeric status can be expressed as a `StatusFault`,
/// regardless of its concrete type. `reqwest::Error`s that carry a status
/// convert into one automatically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusFault {
    /// The HTTP-like status. `0` is replaced by `500` on normalization.
    pub status: u16,
    /// Optional message. Empty or absent is replaced by `"API request failed"`.
    pub message: Option<String>,
    /// Optional machine-readable code, passed through as is.
    pub code: Option<String>,
    /// Optional details, passed through as is.
    pub details: Option<ErrorDetails>,
}

impl StatusFault {
    /// A fault with only a status.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// Sets the message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Sets the details.
    pub fn with_details(mut self, details: ErrorDetails) -> Self {
        self.details = Some(details);
        self
    }
}

/// Anything an operation run by [`safe_request`] can fail with.
///
/// Variants are listed in classification priority order.
pub enum Failure {
    /// Already normalized; passed through unchanged.
    Api(ApiError),
    /// Raised by a [`Schema`](crate::schema::Schema) directly.
    Schema(SchemaError),
    /// A foreign error exposing a status.
    Status(StatusFault),
    /// Any other error value with a message.
    Generic(Box<dyn std::error::Error + Send + Sync>),
    /// A value with no usable message, such as a panic payload.
    Opaque(Box<dyn Any + Send>),
}

impl Failure {
    /// Wraps any error type as [`Failure::Generic`].
    pub fn generic(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Failure::Generic(Box::new(err))
    }

    /// Normalizes this failure into an [`ApiError`].
    ///
    /// # Examples
    ///
    /// ```
    /// use safecall::{ErrorCode, Failure, StatusFault};
    ///
    /// // A zero status and empty message both fall back.
    /// let err = Failure::from(StatusFault::new(0).with_message("")).into_api_error();
    /// assert_eq!(err.status(), 500);
    /// assert_eq!(err.message(), "API request failed");
    ///
    /// let err = Failure::from("boom").into_api_error();
    /// assert_eq!(err.code(), Some(&ErrorCode::UnknownError));
    /// assert_eq!(err.message(), "Unknown error");
    /// ```
    pub fn into_api_error(self) -> ApiError {
        match self {
            Failure::Api(err) => err,
            Failure::Schema(err) => ApiError::new("Data validation failed", 422)
                .with_code(ErrorCode::ValidationError)
                .with_details(ErrorDetails::Issues(err.issues)),
            Failure::Status(fault) => {
                let message = fault
                    .message
                    .filter(|message| !message.is_empty())
                    .unwrap_or_else(|| TRANSPORT_FALLBACK_MESSAGE.to_string());
                let status = match fault.status {
                    0 => TRANSPORT_FALLBACK_STATUS,
                    status => status,
                };
                let mut err = ApiError::new(message, status);
                if let Some(code) = fault.code {
                    err = err.with_code(code);
                }
                if let Some(details) = fault.details {
                    err = err.with_details(details);
                }
                err
            }
            Failure::Generic(source) => {
                let message = source.to_string();
                let message = if message.is_empty() {
                    UNKNOWN_MESSAGE.to_string()
                } else {
                    message
                };
                ApiError::new(message, 0).with_code(ErrorCode::UnknownError)
            }
            Failure::Opaque(_) => ApiError::new(UNKNOWN_MESSAGE, 0).with_code(ErrorCode::UnknownError),
        }
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Api(err) => f.debug_tuple("Api").field(err).finish(),
            Failure::Schema(err) => f.debug_tuple("Schema").field(err).finish(),
            Failure::Status(fault) => f.debug_tuple("Status").field(fault).finish(),
            Failure::Generic(source) => f.debug_tuple("Generic").field(source).finish(),
            Failure::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

impl From<Failure> for ApiError {
    fn from(failure: Failure) -> Self {
        failure.into_api_error()
    }
}

impl From<ApiError> for Failure {
    fn from(err: ApiError) -> Self {
        Failure::Api(err)
    }
}

impl From<SchemaError> for Failure {
    fn from(err: SchemaError) -> Self {
        Failure::Schema(err)
    }
}

impl From<StatusFault> for Failure {
    fn from(fault: StatusFault) -> Self {
        Failure::Status(fault)
    }
}

/// Transport errors are resolved before they reach the executor.
impl From<crate::Error> for Failure {
    fn from(err: crate::Error) -> Self {
        Failure::Api(ApiError::from(err))
    }
}

impl From<reqwest::Error> for Failure {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Failure::Status(
                StatusFault::new(status.as_u16()).with_message(err.to_string()),
            ),
            None => Failure::generic(err),
        }
    }
}

impl From<serde_json::Error> for Failure {
    fn from(err: serde_json::Error) -> Self {
        Failure::generic(err)
    }
}

impl From<String> for Failure {
    fn from(value: String) -> Self {
        Failure::Opaque(Box::new(value))
    }
}

impl From<&'static str> for Failure {
    fn from(value: &'static str) -> Self {
        Failure::Opaque(Box::new(value))
    }
}

/// Runs `operation` and converts its outcome into an [`ApiResult`].
///
/// The returned future always resolves: errors of every kind, and panics
/// raised while creating or polling the operation, are normalized through
/// [`Failure::into_api_error`]. There are no retries and no timeouts here;
/// timeouts must already have been resolved by the transport.
///
/// # Examples
///
/// ```
/// use safecall::{safe_request, ApiError, ErrorCode, Failure};
///
/// # async fn example() {
/// let result = safe_request(|| async { Ok::<_, Failure>(7) }).await;
/// assert_eq!(result, Ok(7));
///
/// let result = safe_request(|| async {
///     Err::<u8, _>(Failure::from(ApiError::new("nope", 400)))
/// })
/// .await;
/// assert_eq!(result.unwrap_err().status(), 400);
/// # }
/// ```
pub async fn safe_request<T, F, Fut>(operation: F) -> ApiResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, Failure>>,
{
    let outcome = AssertUnwindSafe(async move { operation().await })
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(Failure::Opaque(payload)));

    match outcome {
        Ok(value) => ok(value),
        Err(failure) => {
            let err = failure.into_api_error();
            tracing::debug!(
                status = err.status(),
                code = err.code().map(ErrorCode::as_str),
                message = %err,
                "Request normalized to failure"
            );
            fail(err)
        }
    }
}

//! Transport-level error types.
//!
//! These errors come out of [`Client`](crate::Client) and keep the raw HTTP
//! details around for logging. They never reach resource callers directly:
//! the resolver in [`resolve`](crate::resolve) turns each one into an
//! [`ApiError`](crate::ApiError) with a stable code.

use http::{HeaderMap, StatusCode};

/// Errors raised by the HTTP transport.
///
/// # Examples
///
/// ```
/// use safecall::{ApiError, Error, ErrorCode};
/// use http::{HeaderMap, StatusCode};
///
/// let err = Error::HttpError {
///     status: StatusCode::NOT_FOUND,
///     raw_response: String::new(),
///     headers: HeaderMap::new(),
/// };
///
/// let resolved = ApiError::from(err);
/// assert_eq!(resolved.code(), Some(&ErrorCode::NotFound));
/// assert_eq!(resolved.status(), 404);
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// No response was obtained (connection refused, DNS failure, etc.).
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The request exceeded the client's configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The response body could not be decoded.
    ///
    /// Both the raw body and the serde message are preserved.
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// The server returned a non-2xx status.
    #[error("HTTP error {status}: {raw_response}")]
    HttpError {
        /// The HTTP status code
        status: StatusCode,
        /// The raw response body
        raw_response: String,
        /// The response headers
        headers: HeaderMap,
    },

    /// The client or request was misconfigured.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The request body could not be serialized.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// A URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else {
            Error::Network(err)
        }
    }
}

impl Error {
    /// Returns the HTTP status code if a response was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::HttpError { status, .. } => Some(*status),
            Error::DeserializationFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body if one was received.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::HttpError { raw_response, .. } => Some(raw_response),
            Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }
}

/// A specialized `Result` type for transport calls.
pub type Result<T> = std::result::Result<T, Error>;

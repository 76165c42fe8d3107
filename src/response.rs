//! Successful transport responses.
//!
//! [`Response`] keeps the decoded body together with the HTTP details the
//! resource layer logs: status, headers, the raw body and latency.

use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// A successful (2xx) HTTP response with its decoded body.
///
/// # Examples
///
/// ```
/// # use safecall::Response;
/// # use http::{HeaderMap, StatusCode};
/// # use std::time::Duration;
/// let response = Response::new(
///     serde_json::json!({ "id": 1 }),
///     r#"{"id":1}"#.to_string(),
///     StatusCode::OK,
///     HeaderMap::new(),
///     Duration::from_millis(12),
/// );
///
/// assert_eq!(response["id"], 1);
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The decoded response body. An empty body decodes as JSON `null`.
    pub data: T,

    /// The raw response body as a string.
    pub raw_body: String,

    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// Time from sending the request until the body was read.
    pub latency: Duration,
}

impl<T> Response<T> {
    /// Creates a new `Response`.
    pub fn new(
        data: T,
        raw_body: String,
        status: StatusCode,
        headers: HeaderMap,
        latency: Duration,
    ) -> Self {
        Self {
            data,
            raw_body,
            status,
            headers,
            latency,
        }
    }

    /// Consumes the response, returning only the decoded body.
    pub fn into_data(self) -> T {
        self.data
    }

    /// Returns a header value by name, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

impl<T> AsRef<T> for Response<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

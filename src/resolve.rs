//! Transport resolver.
//!
//! Maps transport [`Error`]s onto [`ApiError`]s. Callers branch on the
//! resulting codes, so the status-to-code table is fixed:
//!
//! | status | code |
//! |---|---|
//! | 400 | `BAD_REQUEST` |
//! | 401 | `UNAUTHORIZED` |
//! | 403 | `FORBIDDEN` |
//! | 404 | `NOT_FOUND` |
//! | 408, or client-side timeout | `REQUEST_TIMEOUT` |
//! | 500 | `INTERNAL_SERVER_ERROR` |
//! | no response | `FETCH_ERROR`, status 0 |
//!
//! Any other status keeps its number and gets `HTTP_ERROR`.

use crate::api_error::{ApiError, ErrorCode, ErrorDetails};
use crate::Error;
use http::StatusCode;

/// Returns the code for a non-success HTTP status.
pub fn code_for_status(status: StatusCode) -> ErrorCode {
    match status.as_u16() {
        400 => ErrorCode::BadRequest,
        401 => ErrorCode::Unauthorized,
        403 => ErrorCode::Forbidden,
        404 => ErrorCode::NotFound,
        408 => ErrorCode::RequestTimeout,
        500 => ErrorCode::InternalServerError,
        _ => ErrorCode::HttpError,
    }
}

/// Picks a message for an error response: the body's JSON `message` field if
/// there is a non-empty one, otherwise the canonical reason phrase.
fn http_message(status: StatusCode, raw_response: &str) -> String {
    serde_json::from_str::<serde_json::Value>(raw_response)
        .ok()
        .and_then(|body| body.get("message")?.as_str().map(str::to_string))
        .filter(|message| !message.is_empty())
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()))
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::HttpError {
                status,
                raw_response,
                ..
            } => {
                let resolved = ApiError::new(http_message(status, &raw_response), status.as_u16())
                    .with_code(code_for_status(status));
                if raw_response.is_empty() {
                    resolved
                } else {
                    resolved.with_details(ErrorDetails::Text(raw_response))
                }
            }
            Error::Timeout => ApiError::new("Request timed out", StatusCode::REQUEST_TIMEOUT.as_u16())
                .with_code(ErrorCode::RequestTimeout),
            Error::Network(source) => {
                ApiError::new(format!("Network error: {}", source), 0).with_code(ErrorCode::FetchError)
            }
            other => ApiError::new(other.to_string(), 0).with_code(ErrorCode::UnknownError),
        }
    }
}

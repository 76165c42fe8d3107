//! The error value every resource call surfaces to its caller.
//!
//! An [`ApiError`] carries an HTTP-like status (`0` for failures that never
//! produced a response), a machine-readable [`ErrorCode`], a human message and
//! an optional opaque [`ErrorDetails`] payload. It is built once at the point
//! where the failure is detected and never mutated afterwards.

use crate::schema::ValidationIssue;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The fixed `name` emitted in every [`ErrorRecord`].
pub const ERROR_NAME: &str = "ApiError";

/// Machine-readable error category.
///
/// Callers branch on this rather than on the message text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// An identifier failed [`check_id`](crate::validate::check_id).
    InvalidId,
    /// An email failed [`check_email`](crate::validate::check_email).
    InvalidEmail,
    /// A payload or response did not match its schema.
    ValidationError,
    /// HTTP 400.
    BadRequest,
    /// HTTP 401.
    Unauthorized,
    /// HTTP 403.
    Forbidden,
    /// HTTP 404.
    NotFound,
    /// HTTP 408 or a client-side timeout.
    RequestTimeout,
    /// HTTP 500.
    InternalServerError,
    /// No response was obtained at all.
    FetchError,
    /// Anything that could not be categorized.
    UnknownError,
    /// A non-success HTTP status with no dedicated code.
    HttpError,
    /// A code supplied by a foreign status-bearing error.
    ///
    /// Only built by [`ErrorCode::from`], so a known code string always maps
    /// to its dedicated variant.
    Other(CustomCode),
}

/// A code string with no dedicated [`ErrorCode`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomCode(String);

impl CustomCode {
    /// The code as received.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ErrorCode {
    /// Returns the wire representation, e.g. `"NOT_FOUND"`.
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::InvalidId => "INVALID_ID",
            ErrorCode::InvalidEmail => "INVALID_EMAIL",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::RequestTimeout => "REQUEST_TIMEOUT",
            ErrorCode::InternalServerError => "INTERNAL_SERVER_ERROR",
            ErrorCode::FetchError => "FETCH_ERROR",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
            ErrorCode::HttpError => "HTTP_ERROR",
            ErrorCode::Other(code) => code.as_str(),
        }
    }
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        match code {
            "INVALID_ID" => ErrorCode::InvalidId,
            "INVALID_EMAIL" => ErrorCode::InvalidEmail,
            "VALIDATION_ERROR" => ErrorCode::ValidationError,
            "BAD_REQUEST" => ErrorCode::BadRequest,
            "UNAUTHORIZED" => ErrorCode::Unauthorized,
            "FORBIDDEN" => ErrorCode::Forbidden,
            "NOT_FOUND" => ErrorCode::NotFound,
            "REQUEST_TIMEOUT" => ErrorCode::RequestTimeout,
            "INTERNAL_SERVER_ERROR" => ErrorCode::InternalServerError,
            "FETCH_ERROR" => ErrorCode::FetchError,
            "UNKNOWN_ERROR" => ErrorCode::UnknownError,
            "HTTP_ERROR" => ErrorCode::HttpError,
            other => ErrorCode::Other(CustomCode(other.to_string())),
        }
    }
}

impl From<String> for ErrorCode {
    fn from(code: String) -> Self {
        ErrorCode::from(code.as_str())
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(ErrorCode::from(code))
    }
}

/// Free-form payload attached to an error.
///
/// Its shape depends on where the error came from, so it is kept opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetails {
    /// Every field-level mismatch found by a schema check.
    Issues(Vec<ValidationIssue>),
    /// A response body or trace as text.
    Text(String),
    /// Anything else.
    Json(serde_json::Value),
}

/// Any failure surfaced to a caller of a resource operation.
///
/// # Examples
///
/// ```
/// use safecall::{ApiError, ErrorCode};
///
/// let err = ApiError::new("Invalid user ID", 400).with_code(ErrorCode::InvalidId);
///
/// assert_eq!(err.status(), 400);
/// assert_eq!(err.code(), Some(&ErrorCode::InvalidId));
/// assert_eq!(err.to_string(), "Invalid user ID");
/// ```
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ApiError {
    message: String,
    status: u16,
    code: Option<ErrorCode>,
    details: Option<ErrorDetails>,
}

impl ApiError {
    /// Creates an error with no code and no details.
    pub fn new(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status,
            code: None,
            details: None,
        }
    }

    /// Attaches a machine-readable code.
    pub fn with_code(mut self, code: impl Into<ErrorCode>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attaches a details payload.
    pub fn with_details(mut self, details: ErrorDetails) -> Self {
        self.details = Some(details);
        self
    }

    /// The human-readable description.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The HTTP-like status; `0` when no response was involved.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The machine-readable category, if any.
    pub fn code(&self) -> Option<&ErrorCode> {
        self.code.as_ref()
    }

    /// The opaque details payload, if any.
    pub fn details(&self) -> Option<&ErrorDetails> {
        self.details.as_ref()
    }

    /// Returns `true` if this error carries the given code.
    pub fn has_code(&self, code: &ErrorCode) -> bool {
        self.code.as_ref() == Some(code)
    }

    /// Returns the validation issues when the details hold an issue list.
    pub fn issues(&self) -> Option<&[ValidationIssue]> {
        match &self.details {
            Some(ErrorDetails::Issues(issues)) => Some(issues),
            _ => None,
        }
    }

    /// Flattens the error into a plain record suitable for JSON transport.
    ///
    /// All five keys are always present in the serialized record.
    pub fn to_record(&self) -> ErrorRecord {
        ErrorRecord {
            name: ERROR_NAME.to_string(),
            message: self.message.clone(),
            status: self.status,
            code: self.code.clone(),
            details: self.details.clone(),
        }
    }
}

/// Plain serializable view of an [`ApiError`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Always [`ERROR_NAME`] when produced by [`ApiError::to_record`].
    pub name: String,
    /// See [`ApiError::message`].
    pub message: String,
    /// See [`ApiError::status`].
    pub status: u16,
    /// See [`ApiError::code`].
    pub code: Option<ErrorCode>,
    /// See [`ApiError::details`].
    pub details: Option<ErrorDetails>,
}

impl From<ErrorRecord> for ApiError {
    fn from(record: ErrorRecord) -> Self {
        Self {
            message: record.message,
            status: record.status,
            code: record.code,
            details: record.details,
        }
    }
}

impl Serialize for ApiError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_record().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ApiError {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        ErrorRecord::deserialize(deserializer).map(ApiError::from)
    }
}

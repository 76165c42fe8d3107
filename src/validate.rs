//! Input validators.
//!
//! Each validator is synchronous and either returns normally or fails with an
//! [`ApiError`]. They run before any request is issued, so bad input never
//! costs a round trip.

use crate::api_error::{ApiError, ErrorCode, ErrorDetails};
use crate::schema::{Schema, EMAIL_RE};
use serde_json::Value;

/// Largest integer that survives a round trip through an IEEE-754 double.
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// A value that may be used as a resource identifier.
///
/// Implemented for every primitive integer and float so that callers can pass
/// whatever numeric type they hold; [`check_id`] decides whether it is usable.
pub trait IdLike: Copy {
    /// Converts to a `u64` if the value is a finite, strictly positive integer
    /// no larger than [`MAX_SAFE_INTEGER`].
    fn to_id(self) -> Option<u64>;
}

macro_rules! impl_id_like_unsigned {
    ($($t:ty),*) => {$(
        impl IdLike for $t {
            fn to_id(self) -> Option<u64> {
                let id = u64::try_from(self).ok()?;
                (id > 0 && id <= MAX_SAFE_INTEGER).then_some(id)
            }
        }
    )*};
}

macro_rules! impl_id_like_signed {
    ($($t:ty),*) => {$(
        impl IdLike for $t {
            fn to_id(self) -> Option<u64> {
                u64::try_from(self).ok()?.to_id()
            }
        }
    )*};
}

impl_id_like_unsigned!(u8, u16, u32, u64, u128, usize);
impl_id_like_signed!(i8, i16, i32, i64, i128, isize);

impl IdLike for f64 {
    fn to_id(self) -> Option<u64> {
        let in_range = self.is_finite()
            && self.fract() == 0.0
            && self > 0.0
            && self <= MAX_SAFE_INTEGER as f64;
        in_range.then_some(self as u64)
    }
}

impl IdLike for f32 {
    fn to_id(self) -> Option<u64> {
        f64::from(self).to_id()
    }
}

/// Validates a resource identifier and returns it as a `u64`.
///
/// # Errors
///
/// Returns `ApiError("Invalid user ID", 400, INVALID_ID)` for zero, negative,
/// fractional, non-finite, or out-of-range values.
///
/// # Examples
///
/// ```
/// use safecall::validate::check_id;
///
/// assert_eq!(check_id(42).unwrap(), 42);
/// assert!(check_id(-1).is_err());
/// assert!(check_id(1.5).is_err());
/// assert!(check_id(f64::NAN).is_err());
/// ```
pub fn check_id(id: impl IdLike) -> Result<u64, ApiError> {
    id.to_id()
        .ok_or_else(|| ApiError::new("Invalid user ID", 400).with_code(ErrorCode::InvalidId))
}

/// Validates an email address.
///
/// # Errors
///
/// Returns `ApiError("Invalid email format", 400, INVALID_EMAIL)` if the string
/// is not of the form `local@domain.tld`, contains whitespace, or has leading,
/// trailing, or doubled dots.
pub fn check_email(email: &str) -> Result<(), ApiError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(ApiError::new("Invalid email format", 400).with_code(ErrorCode::InvalidEmail))
    }
}

/// Validates `data` against `schema`, naming it `"data"` in the error.
///
/// # Errors
///
/// See [`check_schema_named`].
pub fn check_schema(data: &Value, schema: &Schema) -> Result<(), ApiError> {
    check_schema_named(data, schema, "data")
}

/// Validates `data` against `schema`.
///
/// Unknown extra fields are tolerated.
///
/// # Errors
///
/// Returns `ApiError("Validation failed for {name}", 422, VALIDATION_ERROR)`
/// whose details list every field-level issue.
pub fn check_schema_named(data: &Value, schema: &Schema, name: &str) -> Result<(), ApiError> {
    schema.validate(data).map_err(|err| {
        ApiError::new(format!("Validation failed for {name}"), 422)
            .with_code(ErrorCode::ValidationError)
            .with_details(ErrorDetails::Issues(err.issues))
    })
}

//! The result type returned by every resource operation.
//!
//! [`ApiResult`] is an ordinary `Result`, so exactly one of value and error is
//! present by construction. [`ResultTuple`] carries it over the wire as the
//! positional triple `[ok, data, error]`.

use crate::api_error::{ApiError, ErrorRecord};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::{SerializeTuple, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of a resource operation.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Builds a successful result.
pub fn ok<T>(value: T) -> ApiResult<T> {
    Ok(value)
}

/// Builds a failed result.
pub fn fail<T>(error: ApiError) -> ApiResult<T> {
    Err(error)
}

/// Positional wire form of an [`ApiResult`]: `[is_success, data, error]`.
///
/// On success `error` is `null`; on failure `data` is `null`. A void success
/// (`ResultTuple<()>`) encodes as `[true, null, null]`.
///
/// # Examples
///
/// ```
/// use safecall::{ApiError, ResultTuple};
///
/// let tuple = ResultTuple::from(Ok::<_, ApiError>(vec![1, 2]));
/// assert_eq!(serde_json::to_string(&tuple).unwrap(), "[true,[1,2],null]");
///
/// let (ok, data, err) = tuple.into_parts();
/// assert!(ok && data.is_some() && err.is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTuple<T>(pub ApiResult<T>);

impl<T> ResultTuple<T> {
    /// Splits into `(is_success, data, error)`.
    pub fn into_parts(self) -> (bool, Option<T>, Option<ApiError>) {
        match self.0 {
            Ok(data) => (true, Some(data), None),
            Err(err) => (false, None, Some(err)),
        }
    }

    /// Returns the wrapped result.
    pub fn into_result(self) -> ApiResult<T> {
        self.0
    }

    /// Returns `true` on success.
    pub fn is_ok(&self) -> bool {
        self.0.is_ok()
    }
}

impl<T> From<ApiResult<T>> for ResultTuple<T> {
    fn from(result: ApiResult<T>) -> Self {
        Self(result)
    }
}

impl<T: Serialize> Serialize for ResultTuple<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(3)?;
        match &self.0 {
            Ok(data) => {
                tuple.serialize_element(&true)?;
                tuple.serialize_element(data)?;
                tuple.serialize_element(&Option::<ErrorRecord>::None)?;
            }
            Err(err) => {
                tuple.serialize_element(&false)?;
                tuple.serialize_element(&Value::Null)?;
                tuple.serialize_element(&err.to_record())?;
            }
        }
        tuple.end()
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for ResultTuple<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (is_success, data, error) =
            <(bool, Value, Option<ErrorRecord>)>::deserialize(deserializer)?;

        match (is_success, error) {
            (true, None) => T::deserialize(data)
                .map(|value| Self(Ok(value)))
                .map_err(de::Error::custom),
            (false, Some(record)) if data.is_null() => Ok(Self(Err(record.into()))),
            (false, Some(_)) => Err(de::Error::custom("failed result must not carry data")),
            (true, Some(_)) => Err(de::Error::custom("successful result must not carry an error")),
            (false, None) => Err(de::Error::custom("failed result must carry an error")),
        }
    }
}

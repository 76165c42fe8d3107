//! JSON Schema checks for wire payloads.
//!
//! A [`Schema`] wraps a JSON Schema document and validates values with the
//! `jsonschema` crate. Unlike a plain serde deserialization, validation keeps
//! going after the first mismatch and reports every field-level
//! [`ValidationIssue`]. Unknown object keys are tolerated unless the document
//! closes them with `additionalProperties`.
//!
//! # Examples
//!
//! ```
//! use safecall::schema::Schema;
//! use serde_json::json;
//!
//! let schema = Schema::new(json!({
//!     "type": "object",
//!     "required": ["id", "email"],
//!     "properties": {
//!         "id": { "type": "integer", "minimum": 1 },
//!         "email": { "type": "string" }
//!     }
//! }));
//!
//! assert!(schema.validate(&json!({ "id": 1, "email": "a@b.io", "extra": true })).is_ok());
//!
//! let err = schema.validate(&json!({ "id": "1" })).unwrap_err();
//! assert_eq!(err.issues.len(), 2);
//! ```

use jsonschema::error::{ValidationError, ValidationErrorKind};
use jsonschema::paths::PathChunk;
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Dot-atom local part, dotted domain with an alphabetic TLD.
pub(crate) const EMAIL_PATTERN: &str = r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}$";

pub(crate) static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(EMAIL_PATTERN).expect("Invalid email regex"));

/// What kind of mismatch a [`ValidationIssue`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// The value has the wrong JSON type.
    InvalidType,
    /// A required field is missing.
    Required,
    /// A string does not match its pattern or format.
    InvalidString,
    /// A value is below its lower bound.
    TooSmall,
    /// Any other schema keyword failed.
    Invalid,
}

/// A single field-level mismatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Location of the offending value, e.g. `address.geo.lat` or `[2].email`.
    /// Empty for the root value.
    pub path: String,
    /// The kind of mismatch.
    pub code: IssueCode,
    /// Human-readable description.
    pub message: String,
}

impl ValidationIssue {
    /// An issue about the value as a whole.
    pub fn root(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            path: String::new(),
            code,
            message: message.into(),
        }
    }
}

impl From<ValidationError<'_>> for ValidationIssue {
    fn from(err: ValidationError<'_>) -> Self {
        let mut path = String::new();
        for chunk in err.instance_path.iter() {
            match chunk {
                PathChunk::Index(index) => path.push_str(&format!("[{index}]")),
                PathChunk::Property(name) => push_property(&mut path, name),
                PathChunk::Keyword(keyword) => push_property(&mut path, keyword),
            }
        }

        let (code, message) = match &err.kind {
            ValidationErrorKind::Required { property } => {
                push_property(&mut path, property.as_str().unwrap_or_default());
                (IssueCode::Required, "Required".to_string())
            }
            ValidationErrorKind::Type { .. } => (IssueCode::InvalidType, err.to_string()),
            ValidationErrorKind::Pattern { .. } | ValidationErrorKind::Format { .. } => {
                (IssueCode::InvalidString, "Invalid format".to_string())
            }
            ValidationErrorKind::MinLength { .. } | ValidationErrorKind::Minimum { .. } => {
                (IssueCode::TooSmall, err.to_string())
            }
            _ => (IssueCode::Invalid, err.to_string()),
        };

        Self {
            path,
            code,
            message,
        }
    }
}

fn push_property(path: &mut String, name: &str) {
    if !path.is_empty() {
        path.push('.');
    }
    path.push_str(name);
}

/// Every issue found while validating a value against a [`Schema`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("schema validation failed with {} issue(s)", .issues.len())]
pub struct SchemaError {
    /// All mismatches, ordered by path.
    pub issues: Vec<ValidationIssue>,
}

/// A JSON Schema document.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    document: Value,
}

impl Schema {
    /// Wraps a JSON Schema document.
    pub fn new(document: Value) -> Self {
        Self { document }
    }

    /// A schema for an array whose every element matches `items`.
    pub fn array(items: Schema) -> Self {
        Self::new(json!({ "type": "array", "items": items.document }))
    }

    /// Returns a copy without the named top-level property.
    ///
    /// The property is dropped from both `properties` and `required`.
    pub fn omit(&self, name: &str) -> Self {
        let mut document = self.document.clone();
        if let Some(properties) = document
            .get_mut("properties")
            .and_then(Value::as_object_mut)
        {
            properties.remove(name);
        }
        if let Some(required) = document.get_mut("required").and_then(Value::as_array_mut) {
            required.retain(|field| field.as_str() != Some(name));
        }
        Self::new(document)
    }

    /// Returns a copy with every top-level property optional.
    ///
    /// Properties that are present must still match their schema.
    pub fn partial(&self) -> Self {
        let mut document = self.document.clone();
        if let Some(object) = document.as_object_mut() {
            object.insert("required".to_string(), json!([]));
        }
        Self::new(document)
    }

    /// Checks `value` against this schema, collecting every mismatch.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] listing all issues if the value does not
    /// conform, or a single root issue if the document itself does not compile.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaError> {
        let compiled = JSONSchema::compile(&self.document).map_err(|err| SchemaError {
            issues: vec![ValidationIssue::root(
                IssueCode::Invalid,
                format!("Invalid schema: {err}"),
            )],
        })?;

        let mut issues: Vec<ValidationIssue> = match compiled.validate(value) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.map(ValidationIssue::from).collect(),
        };

        if issues.is_empty() {
            return Ok(());
        }
        issues.sort_by(|a, b| a.path.cmp(&b.path));
        Err(SchemaError { issues })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> Schema {
        Schema::new(json!({
            "type": "object",
            "required": ["id", "name", "email", "address"],
            "properties": {
                "id": { "type": "integer", "minimum": 1 },
                "name": { "type": "string", "minLength": 1 },
                "email": { "type": "string", "pattern": EMAIL_PATTERN },
                "address": {
                    "type": "object",
                    "required": ["city", "geo"],
                    "properties": {
                        "city": { "type": "string" },
                        "geo": {
                            "type": "object",
                            "required": ["lat"],
                            "properties": { "lat": { "type": "string" } }
                        }
                    }
                },
                "nickname": { "type": "string" }
            }
        }))
    }

    fn valid_person() -> Value {
        json!({
            "id": 7,
            "name": "Ada",
            "email": "ada@example.com",
            "address": { "city": "London", "geo": { "lat": "51.5" } },
        })
    }

    #[test]
    fn test_valid_value_passes() {
        assert!(person().validate(&valid_person()).is_ok());
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let mut value = valid_person();
        value["favourite_colour"] = json!("green");
        value["address"]["planet"] = json!("Earth");
        assert!(person().validate(&value).is_ok());
    }

    #[test]
    fn test_missing_required_field_fails() {
        let mut value = valid_person();
        value.as_object_mut().unwrap().remove("name");

        let err = person().validate(&value).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].path, "name");
        assert_eq!(err.issues[0].code, IssueCode::Required);
    }

    #[test]
    fn test_reports_every_issue_with_nested_paths() {
        let value = json!({
            "id": 1.5,
            "name": "",
            "email": "not-an-email",
            "address": { "city": 3, "geo": {} },
            "nickname": 9,
        });

        let err = person().validate(&value).unwrap_err();
        let found: Vec<(&str, IssueCode)> = err
            .issues
            .iter()
            .map(|i| (i.path.as_str(), i.code))
            .collect();
        assert_eq!(
            found,
            vec![
                ("address.city", IssueCode::InvalidType),
                ("address.geo.lat", IssueCode::Required),
                ("email", IssueCode::InvalidString),
                ("id", IssueCode::InvalidType),
                ("name", IssueCode::TooSmall),
                ("nickname", IssueCode::InvalidType),
            ]
        );
    }

    #[test]
    fn test_non_positive_integer_is_too_small() {
        let mut value = valid_person();
        value["id"] = json!(0);
        let err = person().validate(&value).unwrap_err();
        assert_eq!(err.issues[0].code, IssueCode::TooSmall);

        value["id"] = json!(-4);
        assert!(person().validate(&value).is_err());
    }

    #[test]
    fn test_omit_drops_field() {
        let mut value = valid_person();
        value.as_object_mut().unwrap().remove("id");

        assert!(person().validate(&value).is_err());
        assert!(person().omit("id").validate(&value).is_ok());
    }

    #[test]
    fn test_partial_accepts_empty_but_checks_present_fields() {
        let partial = person().partial();
        assert!(partial.validate(&json!({})).is_ok());
        assert!(partial.validate(&json!({ "name": "Grace" })).is_ok());

        let err = partial.validate(&json!({ "email": "nope" })).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].path, "email");
    }

    #[test]
    fn test_null_for_required_field_is_a_type_mismatch() {
        let mut value = valid_person();
        value["name"] = Value::Null;
        let err = person().validate(&value).unwrap_err();
        assert_eq!(err.issues[0].path, "name");
        assert_eq!(err.issues[0].code, IssueCode::InvalidType);
    }

    #[test]
    fn test_array_paths_are_indexed() {
        let schema = Schema::array(person());
        let mut broken = valid_person();
        broken["email"] = json!("broken");

        let err = schema
            .validate(&json!([valid_person(), broken]))
            .unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].path, "[1].email");
    }

    #[test]
    fn test_root_type_mismatch() {
        let err = Schema::array(Schema::new(json!({})))
            .validate(&json!({}))
            .unwrap_err();
        assert_eq!(err.issues[0].path, "");
        assert_eq!(err.issues[0].code, IssueCode::InvalidType);
    }

    #[test]
    fn test_broken_document_is_reported() {
        let err = Schema::new(json!({ "type": "string", "pattern": "(" }))
            .validate(&json!({}))
            .unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].code, IssueCode::Invalid);
        assert!(err.issues[0].message.starts_with("Invalid schema"));
    }
}

//! Form input and field-level validation.
//!
//! # Responsibility
//! - Represent submitted form data as a plain field-value map.
//! - Collect per-field validation failures instead of stopping at the first.
//! - Provide the shared field validators (required text, length caps, status
//!   membership, datetime and id parsing) used by entity schemas.
//!
//! # Invariants
//! - Validators never mutate the submitted map.
//! - A blank status field falls back to `Pending`; a non-member value is a
//!   validation failure, never stored.

use crate::model::entities::{EntityId, Status};
use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Submitted form data: field name to raw string value.
pub type FormData = BTreeMap<String, String>;

/// One failed field with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Validation outcome carrying per-field detail.
///
/// Surfaced to the caller without any store mutation having happened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure for `field`.
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Converts collected failures into a `Result`, keeping `value` on success.
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationError> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "validation failed");
        }
        let detail = self
            .errors
            .iter()
            .map(|err| format!("{}: {}", err.field, err.message))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "validation failed: {detail}")
    }
}

impl Error for ValidationError {}

fn trimmed<'a>(form: &'a FormData, field: &str) -> Option<&'a str> {
    form.get(field).map(|value| value.trim())
}

/// Required non-empty text capped at `max_len` characters.
///
/// Pushes a failure and returns `None` when missing, blank or too long.
pub fn required_text(
    form: &FormData,
    field: &str,
    max_len: usize,
    errors: &mut ValidationError,
) -> Option<String> {
    match trimmed(form, field) {
        None | Some("") => {
            errors.push(field, "this field is required");
            None
        }
        Some(value) if value.chars().count() > max_len => {
            errors.push(field, format!("must be at most {max_len} characters"));
            None
        }
        Some(value) => Some(value.to_string()),
    }
}

/// Optional text capped at `max_len` characters; missing/blank becomes `""`.
pub fn optional_text(
    form: &FormData,
    field: &str,
    max_len: usize,
    errors: &mut ValidationError,
) -> String {
    match trimmed(form, field) {
        None | Some("") => String::new(),
        Some(value) if max_len > 0 && value.chars().count() > max_len => {
            errors.push(field, format!("must be at most {max_len} characters"));
            String::new()
        }
        Some(value) => value.to_string(),
    }
}

/// Status field with the original default: missing/blank means `Pending`,
/// anything outside the closed enumeration is rejected.
pub fn status_field(form: &FormData, field: &str, errors: &mut ValidationError) -> Status {
    match trimmed(form, field) {
        None | Some("") => Status::default(),
        Some(value) => match Status::parse(value) {
            Some(status) => status,
            None => {
                errors.push(
                    field,
                    format!("`{value}` is not one of Pending, In progress, Completed"),
                );
                Status::default()
            }
        },
    }
}

/// Required datetime field, stored as epoch milliseconds.
pub fn datetime_field(form: &FormData, field: &str, errors: &mut ValidationError) -> Option<i64> {
    match trimmed(form, field) {
        None | Some("") => {
            errors.push(field, "this field is required");
            None
        }
        Some(value) => match parse_datetime(value) {
            Some(epoch_ms) => Some(epoch_ms),
            None => {
                errors.push(field, format!("`{value}` is not a valid datetime"));
                None
            }
        },
    }
}

/// Required foreign-key id field (positive integer).
pub fn id_field(form: &FormData, field: &str, errors: &mut ValidationError) -> Option<EntityId> {
    match trimmed(form, field) {
        None | Some("") => {
            errors.push(field, "this field is required");
            None
        }
        Some(value) => match value.parse::<EntityId>() {
            Ok(id) if id > 0 => Some(id),
            _ => {
                errors.push(field, format!("`{value}` is not a valid id"));
                None
            }
        },
    }
}

/// Optional foreign-key id field; missing/blank yields `None`.
pub fn optional_id_field(
    form: &FormData,
    field: &str,
    errors: &mut ValidationError,
) -> Option<EntityId> {
    match trimmed(form, field) {
        None | Some("") => None,
        Some(value) => match value.parse::<EntityId>() {
            Ok(id) if id > 0 => Some(id),
            _ => {
                errors.push(field, format!("`{value}` is not a valid id"));
                None
            }
        },
    }
}

/// Parses form datetime input into epoch milliseconds.
///
/// Accepts RFC 3339 plus the common widget formats the original forms
/// submitted (`YYYY-MM-DD HH:MM[:SS]`, `YYYY-MM-DDTHH:MM`), naive values
/// interpreted as UTC.
pub fn parse_datetime(value: &str) -> Option<i64> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.timestamp_millis());
    }

    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc().timestamp_millis());
        }
    }

    None
}

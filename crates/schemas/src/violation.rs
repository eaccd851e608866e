//! Field-level validation failures.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier describing why a field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCode {
    /// The field is absent or `null`.
    Required,
    /// The field holds a JSON value of the wrong type.
    InvalidType,
    /// The value is blank once trimmed.
    Empty,
    /// The value exceeds its maximum length.
    TooLong,
    /// The value contains characters outside the allowed set.
    InvalidCharacters,
    /// The value is not a well-formed email address.
    InvalidEmail,
    /// The value is not a UUID.
    InvalidUuid,
    /// The value is not an RFC 3339 timestamp.
    InvalidTimestamp,
    /// The value is not an ISO 8601 calendar date (`YYYY-MM-DD`).
    InvalidDate,
    /// The numeric value lies outside its permitted range.
    OutOfRange,
}

impl ViolationCode {
    /// Snake-case identifier used in serialised payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::InvalidType => "invalid_type",
            Self::Empty => "empty",
            Self::TooLong => "too_long",
            Self::InvalidCharacters => "invalid_characters",
            Self::InvalidEmail => "invalid_email",
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidTimestamp => "invalid_timestamp",
            Self::InvalidDate => "invalid_date",
            Self::OutOfRange => "out_of_range",
        }
    }

    /// Human-readable message for `field` failing with this code.
    #[must_use]
    pub fn describe(self, field: &str) -> String {
        match self {
            Self::Required => format!("{field} is required"),
            Self::InvalidType => format!("{field} has the wrong type"),
            Self::Empty => format!("{field} must not be empty"),
            Self::TooLong => format!("{field} is too long"),
            Self::InvalidCharacters => format!("{field} contains invalid characters"),
            Self::InvalidEmail => format!("{field} must be a valid email address"),
            Self::InvalidUuid => format!("{field} must be a valid UUID"),
            Self::InvalidTimestamp => format!("{field} must be an RFC 3339 timestamp"),
            Self::InvalidDate => format!("{field} must be a YYYY-MM-DD date"),
            Self::OutOfRange => format!("{field} is out of range"),
        }
    }
}

impl fmt::Display for ViolationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldViolation {
    field: String,
    code: ViolationCode,
    message: String,
}

impl FieldViolation {
    /// Build a violation using the default message for `code`.
    pub fn new(field: impl Into<String>, code: ViolationCode) -> Self {
        let field = field.into();
        let message = code.describe(&field);
        Self {
            field,
            code,
            message,
        }
    }

    /// Wire name of the offending field.
    #[must_use]
    pub fn field(&self) -> &str {
        self.field.as_str()
    }

    /// Reason the field was rejected.
    #[must_use]
    pub const fn code(&self) -> ViolationCode {
        self.code
    }

    /// Human-readable explanation suitable for form display.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Aggregate failure listing every violated field, in input order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} field(s) failed validation", .violations.len())]
pub struct SchemaError {
    violations: Vec<FieldViolation>,
}

impl SchemaError {
    /// Wrap a list of violations.
    #[must_use]
    pub const fn new(violations: Vec<FieldViolation>) -> Self {
        Self { violations }
    }

    /// All recorded violations.
    #[must_use]
    pub fn violations(&self) -> &[FieldViolation] {
        self.violations.as_slice()
    }

    /// Consume the error, returning its violations.
    #[must_use]
    pub fn into_violations(self) -> Vec<FieldViolation> {
        self.violations
    }

    /// First violation recorded for `field`, if any.
    #[must_use]
    pub fn violation_for(&self, field: &str) -> Option<&FieldViolation> {
        self.violations.iter().find(|violation| violation.field == field)
    }
}

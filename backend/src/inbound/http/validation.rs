//! Translation of validation failures into `invalid_request` errors.
//!
//! Multi-field failures carry `{"violations": [{field, code, message}]}`;
//! single-field failures carry `{"field", "code"}` (plus `index` for list
//! items).

use schemas::{FieldViolation, SchemaError, ViolationCode};
use serde_json::json;

use crate::domain::{
    CheckinValidationError, CoachPromptValidationError, Error, PlanValidationError,
    UserValidationError, VerificationError,
};

const VALIDATION_MESSAGE: &str = "request failed validation";

/// Error listing every violated field.
pub(crate) fn violations_error(violations: &[FieldViolation]) -> Error {
    Error::invalid_request(VALIDATION_MESSAGE).with_details(json!({ "violations": violations }))
}

/// Error for a schema failure.
pub(crate) fn schema_error(error: &SchemaError) -> Error {
    violations_error(error.violations())
}

/// Error for one failing field.
pub(crate) fn field_error(field: &str, code: ViolationCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code.as_str(),
    }))
}

/// Validate a value, recording a violation under `field` on failure.
pub(crate) fn collect<T>(
    violations: &mut Vec<FieldViolation>,
    field: &str,
    result: Result<T, UserValidationError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            violations.push(FieldViolation::new(field, err.code()));
            None
        }
    }
}

pub(crate) fn plan_error(error: &PlanValidationError) -> Error {
    let (field, code, index) = match error {
        PlanValidationError::EmptyTitle => ("title", ViolationCode::Empty, None),
        PlanValidationError::TitleTooLong { .. } => ("title", ViolationCode::TooLong, None),
        PlanValidationError::NoMilestones => ("milestones", ViolationCode::Empty, None),
        PlanValidationError::TooManyMilestones { .. } => {
            ("milestones", ViolationCode::TooLong, None)
        }
        PlanValidationError::EmptyMilestoneTitle { index } => {
            ("milestones", ViolationCode::Empty, Some(*index))
        }
        PlanValidationError::MilestoneTitleTooLong { index, .. } => {
            ("milestones", ViolationCode::TooLong, Some(*index))
        }
        PlanValidationError::InconsistentProgress => {
            return Error::internal(error.to_string());
        }
    };
    let details = match index {
        Some(index) => json!({ "field": field, "code": code.as_str(), "index": index }),
        None => json!({ "field": field, "code": code.as_str() }),
    };
    Error::invalid_request(error.to_string()).with_details(details)
}

pub(crate) fn checkin_error(error: &CheckinValidationError) -> Error {
    let code = match error {
        CheckinValidationError::NoteTooLong => ViolationCode::TooLong,
        _ => ViolationCode::OutOfRange,
    };
    field_error(error.field(), code, error.to_string())
}

pub(crate) fn coach_prompt_error(error: &CoachPromptValidationError) -> Error {
    let code = match error {
        CoachPromptValidationError::Empty => ViolationCode::Empty,
        CoachPromptValidationError::TooLong { .. } => ViolationCode::TooLong,
    };
    field_error("message", code, error.to_string())
}

pub(crate) fn code_format_error(error: VerificationError) -> Error {
    field_error("code", ViolationCode::InvalidCharacters, error.to_string())
}

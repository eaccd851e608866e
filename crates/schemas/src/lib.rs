//! Validation schemas shared by the Retire Strong backend and its clients.
//!
//! Each schema turns an untrusted [`serde_json::Value`] into a strongly typed
//! record, or a [`SchemaError`] listing every field that failed and why. The
//! record types are the static shape the schema produces, and the field
//! validators in [`fields`] are reused by the domain model so the two never
//! drift apart.
//!
//! # Examples
//! ```
//! use schemas::{Schema, UserSchema, ViolationCode};
//! use serde_json::json;
//!
//! let error = UserSchema::validate(&json!({ "email": "not-an-email" }))
//!     .expect_err("incomplete user");
//! let email = error.violation_for("email").expect("email violation");
//! assert_eq!(email.code(), ViolationCode::InvalidEmail);
//! assert!(error.violation_for("userId").is_some());
//! ```

mod checkin;
pub mod fields;
mod reader;
mod user;
mod violation;

pub use checkin::{CheckinSchema, CheckinSubmission};
pub use user::{UserRecord, UserSchema};
pub use violation::{FieldViolation, SchemaError, ViolationCode};

use serde_json::Value;

/// A declarative validator producing a typed record from untrusted JSON.
///
/// Implementations are side-effect free and deterministic: the same input
/// always yields the same record or the same set of violations.
pub trait Schema {
    /// Record produced when validation succeeds.
    type Output;

    /// Validate `input`, reporting every violated field on failure.
    ///
    /// # Errors
    /// Returns [`SchemaError`] when any field is missing, mistyped, or breaks
    /// a constraint.
    fn validate(input: &Value) -> Result<Self::Output, SchemaError>;
}

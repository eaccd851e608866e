//! Translation of driven-port failures into domain errors.
//!
//! Connection failures become `service_unavailable` so callers know to
//! retry; query failures become `internal_error`. Neither is ever reported as
//! a business-rule violation. Entity-specific variants that services expect
//! (duplicates, missing rows) are handled at the call site before falling
//! back to these conversions.

use tracing::{error, warn};

use super::Error;
use super::ports::{
    CheckinRepositoryError, PlanRepositoryError, SessionRepositoryError, UserRepositoryError,
    VerificationNotifierError,
};

fn unavailable(port: &'static str, message: &str) -> Error {
    warn!(port, %message, "repository unavailable");
    Error::service_unavailable(format!("{port} repository unavailable"))
}

fn failed(port: &'static str, kind: &'static str, message: &str) -> Error {
    error!(port, kind, %message, "repository operation failed");
    Error::internal(format!("{port} repository error: {message}"))
}

impl From<UserRepositoryError> for Error {
    fn from(value: UserRepositoryError) -> Self {
        match value {
            UserRepositoryError::Connection { message } => unavailable("user", &message),
            UserRepositoryError::DuplicateEmail { .. } => {
                Error::conflict("an account with this email already exists")
            }
            other => failed("user", other.kind(), &other.to_string()),
        }
    }
}

impl From<PlanRepositoryError> for Error {
    fn from(value: PlanRepositoryError) -> Self {
        match value {
            PlanRepositoryError::Connection { message } => unavailable("plan", &message),
            PlanRepositoryError::ActivePlanExists { .. } => {
                Error::conflict("an active plan already exists")
            }
            other => failed("plan", other.kind(), &other.to_string()),
        }
    }
}

impl From<SessionRepositoryError> for Error {
    fn from(value: SessionRepositoryError) -> Self {
        match value {
            SessionRepositoryError::Connection { message } => unavailable("session", &message),
            other => failed("session", other.kind(), &other.to_string()),
        }
    }
}

impl From<CheckinRepositoryError> for Error {
    fn from(value: CheckinRepositoryError) -> Self {
        match value {
            CheckinRepositoryError::Connection { message } => unavailable("checkin", &message),
            CheckinRepositoryError::DuplicateDay { day } => {
                Error::conflict(format!("checkin already recorded for {day}"))
            }
            other => failed("checkin", other.kind(), &other.to_string()),
        }
    }
}

impl From<VerificationNotifierError> for Error {
    fn from(value: VerificationNotifierError) -> Self {
        warn!(error = %value, "verification code delivery failed");
        Error::service_unavailable("verification code could not be sent")
    }
}

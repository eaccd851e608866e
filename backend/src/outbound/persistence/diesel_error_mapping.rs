//! Classification of Diesel and pool failures shared by the repositories.
//!
//! Each repository turns a [`DieselFailure`] into its own port error, so the
//! mapping from PostgreSQL error kinds lives in one place.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// What went wrong, reduced to the distinctions the ports care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The connection dropped or could not be obtained.
    Connection(String),
    /// A unique constraint or index rejected the write.
    UniqueViolation { constraint: Option<String> },
    /// Anything else.
    Query(String),
}

impl DieselFailure {
    /// Whether the failure came from the named unique constraint.
    pub(crate) fn is_unique(&self, name: &str) -> bool {
        matches!(
            self,
            Self::UniqueViolation { constraint: Some(constraint) } if constraint == name
        )
    }
}

impl From<PoolError> for DieselFailure {
    fn from(error: PoolError) -> Self {
        Self::Connection(error.message().to_owned())
    }
}

impl From<DieselError> for DieselFailure {
    fn from(error: DieselError) -> Self {
        match &error {
            DieselError::DatabaseError(kind, info) => {
                debug!(?kind, message = info.message(), "diesel operation failed");
            }
            _ => debug!(
                error_type = %std::any::type_name_of_val(&error),
                "diesel operation failed"
            ),
        }

        match error {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::UniqueViolation {
                    constraint: info.constraint_name().map(str::to_owned),
                }
            }
            DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
                Self::Connection("database connection error".to_owned())
            }
            DieselError::BrokenTransactionManager => {
                Self::Connection("database transaction manager broken".to_owned())
            }
            DieselError::NotFound => Self::Query("record not found".to_owned()),
            DieselError::QueryBuilderError(_) => Self::Query("database query error".to_owned()),
            DieselError::DeserializationError(_) => {
                Self::Query("database row could not be decoded".to_owned())
            }
            _ => Self::Query("database error".to_owned()),
        }
    }
}

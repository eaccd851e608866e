//! Driven port for login session persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Session, SessionId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by session repository adapters.
    pub enum SessionRepositoryError {
        /// Storage could not be reached; the caller may retry.
        Connection { message: String } => "session repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "session repository query failed: {message}",
        /// An update targeted a session that does not exist.
        NotFound { session_id: String } => "session {session_id} does not exist",
    }
}

/// Port for reading and writing sessions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Insert a new session.
    async fn create(&self, session: &Session) -> Result<Session, SessionRepositoryError>;

    /// Replace a session's state and expiry.
    async fn update(&self, session: &Session) -> Result<Session, SessionRepositoryError>;

    /// Fetch a session by id.
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, SessionRepositoryError>;

    /// Every session belonging to the user, newest first.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Session>, SessionRepositoryError>;

    /// Remove a session. Returns `false` when nothing was deleted.
    async fn delete(&self, id: &SessionId) -> Result<bool, SessionRepositoryError>;

    /// Remove every session whose expiry is at or before `now`, returning
    /// how many were removed.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, SessionRepositoryError>;
}

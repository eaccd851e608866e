//! Driving port for passwordless sign-up, login and logout.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{EmailAddress, Error, NewUser, Session, SessionId, VerificationCode};

/// A pending session waiting for its emailed code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingLogin {
    /// Session to verify.
    pub session_id: SessionId,
    /// When the code stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// Authentication use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Register a user and send their first code.
    async fn sign_up(&self, details: NewUser) -> Result<PendingLogin, Error>;

    /// Send a code to an existing user.
    async fn request_login(&self, email: &EmailAddress) -> Result<PendingLogin, Error>;

    /// Check a code against a pending session, activating it on success.
    async fn verify(
        &self,
        session_id: &SessionId,
        code: &VerificationCode,
    ) -> Result<Session, Error>;

    /// The session if it is currently active; `None` otherwise.
    async fn resolve(&self, session_id: &SessionId) -> Result<Option<Session>, Error>;

    /// Revoke a session. Unknown sessions are ignored.
    async fn log_out(&self, session_id: &SessionId) -> Result<(), Error>;

    /// Remove every session past its expiry. Returns how many went.
    async fn purge_expired(&self) -> Result<usize, Error>;
}

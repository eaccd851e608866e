//! Passwordless authentication use-cases.
//!
//! Sign-up and login both end in a pending session and an emailed code;
//! verifying the code activates the session. Issuing a code discards any
//! earlier pending session for the same user.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    PendingLogin, SessionRepository, SessionService, UserRepository, VerificationNotifier,
};
use crate::domain::{
    EmailAddress, Error, NewUser, Session, SessionId, SessionState, User, UserId,
    VerificationCode, VerificationError,
};

/// [`SessionService`] backed by user and session repositories and a
/// notifier.
#[derive(Clone)]
pub struct SessionServiceImpl<U: ?Sized, S: ?Sized, N: ?Sized> {
    users: Arc<U>,
    sessions: Arc<S>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
}

impl<U: ?Sized, S: ?Sized, N: ?Sized> SessionServiceImpl<U, S, N> {
    /// Create the service.
    pub fn new(users: Arc<U>, sessions: Arc<S>, notifier: Arc<N>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            sessions,
            notifier,
            clock,
        }
    }
}

fn map_verification_error(error: VerificationError) -> Error {
    match error {
        VerificationError::MalformedCode => Error::invalid_request(error.to_string()),
        VerificationError::WrongCode { remaining } => Error::unauthorized(error.to_string())
            .with_details(json!({ "remainingAttempts": remaining })),
        VerificationError::TooManyAttempts => Error::forbidden(error.to_string()),
        VerificationError::Expired | VerificationError::Revoked => {
            Error::unauthorized(error.to_string())
        }
        VerificationError::AlreadyVerified => Error::conflict(error.to_string()),
    }
}

impl<U, S, N> SessionServiceImpl<U, S, N>
where
    U: UserRepository + ?Sized,
    S: SessionRepository + ?Sized,
    N: VerificationNotifier + ?Sized,
{
    /// Drop codes the user has not yet used; only the newest code is valid.
    async fn discard_pending(&self, user_id: &UserId) -> Result<(), Error> {
        for session in self.sessions.list_for_user(user_id).await? {
            if matches!(session.state(), SessionState::PendingVerification { .. }) {
                self.sessions.delete(session.id()).await?;
                debug!(user_id = %user_id, session_id = %session.id(), "superseded code discarded");
            }
        }
        Ok(())
    }

    async fn issue_code(&self, user_id: UserId, email: &EmailAddress) -> Result<PendingLogin, Error> {
        self.discard_pending(&user_id).await?;
        let code = VerificationCode::generate(&mut rand::thread_rng());
        let session = Session::pending(SessionId::random(), user_id, &code, self.clock.utc());
        let session = self.sessions.create(&session).await?;

        if let Err(err) = self.notifier.send_code(email, &code).await {
            if let Err(cleanup) = self.sessions.delete(session.id()).await {
                warn!(error = %cleanup, session_id = %session.id(), "failed to discard undelivered session");
            }
            return Err(err.into());
        }

        info!(user_id = %user_id, session_id = %session.id(), "verification code issued");
        Ok(PendingLogin {
            session_id: *session.id(),
            expires_at: session.expires_at(),
        })
    }
}

#[async_trait]
impl<U, S, N> SessionService for SessionServiceImpl<U, S, N>
where
    U: UserRepository + ?Sized,
    S: SessionRepository + ?Sized,
    N: VerificationNotifier + ?Sized,
{
    async fn sign_up(&self, details: NewUser) -> Result<PendingLogin, Error> {
        if self.users.find_by_email(&details.email).await?.is_some() {
            return Err(Error::conflict("an account with this email already exists"));
        }
        let user = User::register(UserId::random(), details, self.clock.utc());
        let user = self.users.create(&user).await?;
        info!(user_id = %user.id(), "user registered");
        self.issue_code(*user.id(), user.email()).await
    }

    async fn request_login(&self, email: &EmailAddress) -> Result<PendingLogin, Error> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| Error::not_found("no account exists for this email"))?;
        self.issue_code(*user.id(), user.email()).await
    }

    async fn verify(
        &self,
        session_id: &SessionId,
        code: &VerificationCode,
    ) -> Result<Session, Error> {
        let mut session = self
            .sessions
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| Error::unauthorized("verification session not found"))?;

        let before = session.state().clone();
        let outcome = session.verify(code, self.clock.utc());
        if session.state() != &before {
            session = self.sessions.update(&session).await?;
        }

        match outcome {
            Ok(()) => {
                info!(session_id = %session_id, user_id = %session.user_id(), "session verified");
                Ok(session)
            }
            Err(err) => {
                warn!(session_id = %session_id, reason = %err, "verification rejected");
                Err(map_verification_error(err))
            }
        }
    }

    async fn resolve(&self, session_id: &SessionId) -> Result<Option<Session>, Error> {
        let now = self.clock.utc();
        Ok(self
            .sessions
            .find_by_id(session_id)
            .await?
            .filter(|session| session.is_active_at(now)))
    }

    async fn log_out(&self, session_id: &SessionId) -> Result<(), Error> {
        let Some(mut session) = self.sessions.find_by_id(session_id).await? else {
            return Ok(());
        };
        let pending = match session.state() {
            SessionState::Revoked { .. } => return Ok(()),
            SessionState::PendingVerification { .. } => true,
            SessionState::Active { .. } => false,
        };
        // Pending sessions carry nothing worth keeping; active ones stay as
        // revoked records.
        if pending {
            self.sessions.delete(session_id).await?;
        } else {
            session.revoke(self.clock.utc());
            self.sessions.update(&session).await?;
        }
        info!(session_id = %session_id, "session ended");
        Ok(())
    }

    async fn purge_expired(&self) -> Result<usize, Error> {
        let removed = self.sessions.delete_expired(self.clock.utc()).await?;
        if removed > 0 {
            info!(removed, "expired sessions purged");
        }
        Ok(removed)
    }
}

#[cfg(test)]
#[path = "session_service_tests.rs"]
mod tests;

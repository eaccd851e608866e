//! Cookie session helpers.
//!
//! The cookie carries identifiers only: a pending login while the user
//! waits for their code, then the verified session. The session records
//! themselves live behind [`SessionService`](crate::domain::ports::SessionService).

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, SessionId};

pub(crate) const PENDING_SESSION_KEY: &str = "pending_session_id";
pub(crate) const SESSION_KEY: &str = "session_id";

/// Typed view over the Actix cookie session.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Wrap the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    fn read(&self, key: &str) -> Result<Option<SessionId>, Error> {
        let raw = self
            .0
            .get::<String>(key)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(raw.and_then(|raw| {
            let parsed = SessionId::parse(&raw);
            if parsed.is_none() {
                warn!(key, "malformed session identifier in cookie");
            }
            parsed
        }))
    }

    fn write(&self, key: &str, id: &SessionId) -> Result<(), Error> {
        self.0
            .insert(key, id.to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Remember a login awaiting verification.
    pub fn persist_pending(&self, id: &SessionId) -> Result<(), Error> {
        self.write(PENDING_SESSION_KEY, id)
    }

    /// Login awaiting verification, if any.
    pub fn pending_session_id(&self) -> Result<Option<SessionId>, Error> {
        self.read(PENDING_SESSION_KEY)
    }

    /// Store the verified session and forget the pending one.
    pub fn persist_session(&self, id: &SessionId) -> Result<(), Error> {
        self.0.remove(PENDING_SESSION_KEY);
        self.0.renew();
        self.write(SESSION_KEY, id)
    }

    /// Verified session identifier, if any.
    pub fn session_id(&self) -> Result<Option<SessionId>, Error> {
        self.read(SESSION_KEY)
    }

    /// Drop everything from the cookie.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

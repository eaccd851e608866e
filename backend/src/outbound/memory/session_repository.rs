//! In-memory [`SessionRepository`].

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{SessionRepository, SessionRepositoryError};
use crate::domain::{Session, SessionId, UserId};

type Sessions = HashMap<SessionId, Session>;

/// Sessions held in a process-local map.
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<Sessions>,
}

impl InMemorySessionRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Sessions>, SessionRepositoryError> {
        self.sessions
            .read()
            .map_err(|_| SessionRepositoryError::query("session store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Sessions>, SessionRepositoryError> {
        self.sessions
            .write()
            .map_err(|_| SessionRepositoryError::query("session store lock poisoned"))
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, session: &Session) -> Result<Session, SessionRepositoryError> {
        let mut sessions = self.write()?;
        if sessions.contains_key(session.id()) {
            return Err(SessionRepositoryError::query(format!(
                "session {} already exists",
                session.id()
            )));
        }
        sessions.insert(*session.id(), session.clone());
        Ok(session.clone())
    }

    async fn update(&self, session: &Session) -> Result<Session, SessionRepositoryError> {
        let mut sessions = self.write()?;
        let slot = sessions
            .get_mut(session.id())
            .ok_or_else(|| SessionRepositoryError::not_found(session.id().to_string()))?;
        *slot = session.clone();
        Ok(session.clone())
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, SessionRepositoryError> {
        Ok(self.read()?.get(id).cloned())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Session>, SessionRepositoryError> {
        let mut owned: Vec<Session> = self
            .read()?
            .values()
            .filter(|session| session.user_id() == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(owned)
    }

    async fn delete(&self, id: &SessionId) -> Result<bool, SessionRepositoryError> {
        Ok(self.write()?.remove(id).is_some())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, SessionRepositoryError> {
        let mut sessions = self.write()?;
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at() > now);
        Ok(before - sessions.len())
    }
}

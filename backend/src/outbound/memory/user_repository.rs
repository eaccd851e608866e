//! In-memory [`UserRepository`].

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{EmailAddress, User, UserId};

/// Users held in a process-local map.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<UserId, User>>, UserRepositoryError> {
        self.users
            .read()
            .map_err(|_| UserRepositoryError::query("user store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<UserId, User>>, UserRepositoryError> {
        self.users
            .write()
            .map_err(|_| UserRepositoryError::query("user store lock poisoned"))
    }
}

fn email_taken(users: &HashMap<UserId, User>, user: &User) -> bool {
    users
        .values()
        .any(|other| other.email() == user.email() && other.id() != user.id())
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> Result<User, UserRepositoryError> {
        let mut users = self.write()?;
        if email_taken(&users, user) {
            return Err(UserRepositoryError::duplicate_email(user.email().as_ref()));
        }
        if users.contains_key(user.id()) {
            return Err(UserRepositoryError::query(format!(
                "user {} already exists",
                user.id()
            )));
        }
        users.insert(*user.id(), user.clone());
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> Result<User, UserRepositoryError> {
        let mut users = self.write()?;
        if email_taken(&users, user) {
            return Err(UserRepositoryError::duplicate_email(user.email().as_ref()));
        }
        let slot = users
            .get_mut(user.id())
            .ok_or_else(|| UserRepositoryError::not_found(user.id().to_string()))?;
        *slot = user.clone();
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.read()?.get(id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError> {
        Ok(self
            .read()?
            .values()
            .find(|user| user.email() == email)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, UserRepositoryError> {
        let mut users: Vec<User> = self.read()?.values().cloned().collect();
        users.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().as_uuid().cmp(b.id().as_uuid()))
        });
        Ok(users)
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserRepositoryError> {
        Ok(self.write()?.remove(id).is_some())
    }
}

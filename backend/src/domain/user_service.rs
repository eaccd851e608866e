//! Profile and onboarding use-cases.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{UserRepository, UserRepositoryError, UserService};
use crate::domain::{Error, PersonName, User, UserId};

/// [`UserService`] backed by a [`UserRepository`].
#[derive(Clone)]
pub struct UserServiceImpl<R: ?Sized> {
    users: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R: ?Sized> UserServiceImpl<R> {
    /// Create the service.
    pub fn new(users: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { users, clock }
    }
}

impl<R> UserServiceImpl<R>
where
    R: UserRepository + ?Sized,
{
    async fn load(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))
    }

    async fn save(&self, user: &User) -> Result<User, Error> {
        self.users.update(user).await.map_err(|err| match err {
            UserRepositoryError::NotFound { user_id } => {
                Error::not_found(format!("user {user_id} not found"))
            }
            other => other.into(),
        })
    }
}

#[async_trait]
impl<R> UserService for UserServiceImpl<R>
where
    R: UserRepository + ?Sized,
{
    async fn profile(&self, user_id: &UserId) -> Result<User, Error> {
        self.load(user_id).await
    }

    async fn update_names(
        &self,
        user_id: &UserId,
        first_name: PersonName,
        last_name: PersonName,
    ) -> Result<User, Error> {
        let mut user = self.load(user_id).await?;
        user.rename(first_name, last_name, self.clock.utc());
        self.save(&user).await
    }

    async fn complete_onboarding(&self, user_id: &UserId) -> Result<User, Error> {
        let mut user = self.load(user_id).await?;
        if !user.complete_onboarding(self.clock.utc()) {
            return Ok(user);
        }
        let saved = self.save(&user).await?;
        info!(user_id = %user_id, "onboarding completed");
        Ok(saved)
    }

    async fn list_users(&self, caller: &UserId) -> Result<Vec<User>, Error> {
        Ok(self.users.find_by_id(caller).await?.into_iter().collect())
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;

//! Driving port for profile and onboarding use-cases.

use async_trait::async_trait;

use crate::domain::{Error, PersonName, User, UserId};

/// Use-cases over the authenticated user's own record.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    /// Fetch the user's profile.
    async fn profile(&self, user_id: &UserId) -> Result<User, Error>;

    /// Replace the user's given and family names.
    async fn update_names(
        &self,
        user_id: &UserId,
        first_name: PersonName,
        last_name: PersonName,
    ) -> Result<User, Error>;

    /// Mark onboarding complete. Calling it again is a no-op.
    async fn complete_onboarding(&self, user_id: &UserId) -> Result<User, Error>;

    /// Users the caller may see. Members only ever see their own record.
    async fn list_users(&self, caller: &UserId) -> Result<Vec<User>, Error>;
}

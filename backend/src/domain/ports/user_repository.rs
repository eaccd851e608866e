//! Driven port for user persistence.

use async_trait::async_trait;

use crate::domain::{EmailAddress, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Storage could not be reached; the caller may retry.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another user already owns the email address.
        DuplicateEmail { email: String } => "a user with email {email} already exists",
        /// An update targeted a user that does not exist.
        NotFound { user_id: String } => "user {user_id} does not exist",
    }
}

/// Port for reading and writing users. Applies no business rules.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user, rejecting duplicate emails.
    async fn create(&self, user: &User) -> Result<User, UserRepositoryError>;

    /// Replace an existing user's mutable fields.
    async fn update(&self, user: &User) -> Result<User, UserRepositoryError>;

    /// Fetch a user by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch a user by normalised email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// List every user ordered by creation time.
    async fn list(&self) -> Result<Vec<User>, UserRepositoryError>;

    /// Remove a user. Returns `false` when nothing was deleted.
    async fn delete(&self, id: &UserId) -> Result<bool, UserRepositoryError>;
}

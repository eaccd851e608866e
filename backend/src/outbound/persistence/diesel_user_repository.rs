//! PostgreSQL-backed [`UserRepository`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use schemas::UserRecord;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{EmailAddress, User, UserId};

use super::diesel_error_mapping::DieselFailure;
use super::models::{UserChangeset, UserRow};
use super::pool::DbPool;
use super::schema::users;

const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Diesel implementation of the user port.
#[derive(Debug, Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: impl Into<DieselFailure>, user: Option<&User>) -> UserRepositoryError {
    let failure = failure.into();
    match (failure, user) {
        (failure, Some(user)) if failure.is_unique(EMAIL_CONSTRAINT) => {
            UserRepositoryError::duplicate_email(user.email().as_ref())
        }
        (DieselFailure::Connection(message), _) => UserRepositoryError::connection(message),
        (DieselFailure::UniqueViolation { constraint }, _) => UserRepositoryError::query(format!(
            "unique constraint {} violated",
            constraint.as_deref().unwrap_or("unknown")
        )),
        (DieselFailure::Query(message), _) => UserRepositoryError::query(message),
    }
}

fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    let record = UserRecord {
        user_id: row.id,
        email: row.email,
        first_name: row.first_name,
        last_name: row.last_name,
        created_at: row.created_at,
        updated_at: row.updated_at,
        onboarding_complete: Some(row.onboarding_complete),
    };
    User::try_from(record)
        .map_err(|err| UserRepositoryError::query(format!("stored user is invalid: {err}")))
}

fn user_to_row(user: &User) -> UserRow {
    UserRow {
        id: *user.id().as_uuid(),
        email: user.email().as_ref().to_owned(),
        first_name: user.first_name().as_ref().to_owned(),
        last_name: user.last_name().as_ref().to_owned(),
        onboarding_complete: user.onboarding_complete(),
        created_at: user.created_at(),
        updated_at: user.updated_at(),
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &User) -> Result<User, UserRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err, None))?;
        let row = diesel::insert_into(users::table)
            .values(&user_to_row(user))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_failure(err, Some(user)))?;
        row_to_user(row)
    }

    async fn update(&self, user: &User) -> Result<User, UserRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err, None))?;
        let changes = UserChangeset {
            email: user.email().as_ref(),
            first_name: user.first_name().as_ref(),
            last_name: user.last_name().as_ref(),
            onboarding_complete: user.onboarding_complete(),
            updated_at: user.updated_at(),
        };
        let row = diesel::update(users::table.find(user.id().as_uuid()))
            .set(&changes)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_failure(err, Some(user)))?
            .ok_or_else(|| UserRepositoryError::not_found(user.id().to_string()))?;
        row_to_user(row)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err, None))?;
        users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_failure(err, None))?
            .map(row_to_user)
            .transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err, None))?;
        users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_failure(err, None))?
            .map(row_to_user)
            .transpose()
    }

    async fn list(&self) -> Result<Vec<User>, UserRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err, None))?;
        users::table
            .order((users::created_at.asc(), users::id.asc()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_failure(err, None))?
            .into_iter()
            .map(row_to_user)
            .collect()
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err, None))?;
        let deleted = diesel::delete(users::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(|err| map_failure(err, None))?;
        Ok(deleted > 0)
    }
}

//! User data model.
//!
//! Field rules are shared with the `schemas` crate so the API boundary and
//! the domain never disagree about what a valid email or name is.

use std::fmt;

use chrono::{DateTime, Utc};
use schemas::fields::{normalise_email, normalise_person_name};
use schemas::{UserRecord, ViolationCode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors raised while constructing user values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Identifier text was not a canonical UUID.
    InvalidId,
    /// Email failed the shared email rule.
    Email(ViolationCode),
    /// A given or family name failed the shared name rule.
    Name(ViolationCode),
    /// `updatedAt` precedes `createdAt`.
    UpdatedBeforeCreated,
}

impl UserValidationError {
    /// Stable violation code for API payloads.
    pub fn code(&self) -> ViolationCode {
        match self {
            Self::InvalidId => ViolationCode::InvalidUuid,
            Self::Email(code) | Self::Name(code) => *code,
            Self::UpdatedBeforeCreated => ViolationCode::OutOfRange,
        }
    }
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::Email(code) => f.write_str(&code.describe("email")),
            Self::Name(code) => f.write_str(&code.describe("name")),
            Self::UpdatedBeforeCreated => {
                write!(f, "updatedAt must not be earlier than createdAt")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Parse a [`UserId`] from its canonical text form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Normalised (trimmed, lower-cased) email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an email address.
    ///
    /// # Examples
    /// ```
    /// use retire_strong_backend::domain::EmailAddress;
    ///
    /// let email = EmailAddress::new("  Ada@Example.COM ").expect("valid email");
    /// assert_eq!(email.as_ref(), "ada@example.com");
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        normalise_email(raw.as_ref())
            .map(Self)
            .map_err(UserValidationError::Email)
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Trimmed given or family name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonName(String);

impl PersonName {
    /// Validate and trim a person name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        normalise_person_name(raw.as_ref())
            .map(Self)
            .map_err(UserValidationError::Name)
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<PersonName> for String {
    fn from(value: PersonName) -> Self {
        value.0
    }
}

impl TryFrom<String> for PersonName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validated sign-up details for a user who does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Contact and login address.
    pub email: EmailAddress,
    /// Given name.
    pub first_name: PersonName,
    /// Family name.
    pub last_name: PersonName,
}

/// Application user.
///
/// ## Invariants
/// - `email` is trimmed and lower-cased.
/// - `updated_at` is never earlier than `created_at`.
/// - `id` never changes after registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "UserRecord", into = "UserRecord")]
pub struct User {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    user_id: UserId,
    #[schema(value_type = String, example = "ada@example.com")]
    email: EmailAddress,
    #[schema(value_type = String, example = "Ada")]
    first_name: PersonName,
    #[schema(value_type = String, example = "Lovelace")]
    last_name: PersonName,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    onboarding_complete: bool,
}

impl User {
    /// Register a new user at `now`; onboarding starts incomplete.
    pub fn register(id: UserId, details: NewUser, now: DateTime<Utc>) -> Self {
        let NewUser {
            email,
            first_name,
            last_name,
        } = details;
        Self {
            user_id: id,
            email,
            first_name,
            last_name,
            created_at: now,
            updated_at: now,
            onboarding_complete: false,
        }
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.user_id
    }

    /// Login address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Given name.
    pub fn first_name(&self) -> &PersonName {
        &self.first_name
    }

    /// Family name.
    pub fn last_name(&self) -> &PersonName {
        &self.last_name
    }

    /// Registration time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification time.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether onboarding has been completed.
    pub fn onboarding_complete(&self) -> bool {
        self.onboarding_complete
    }

    /// Replace both names, stamping `updated_at`.
    pub fn rename(&mut self, first_name: PersonName, last_name: PersonName, now: DateTime<Utc>) {
        self.first_name = first_name;
        self.last_name = last_name;
        self.touch(now);
    }

    /// Mark onboarding as complete. Returns `false` when it already was.
    pub fn complete_onboarding(&mut self, now: DateTime<Utc>) -> bool {
        if self.onboarding_complete {
            return false;
        }
        self.onboarding_complete = true;
        self.touch(now);
        true
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }
}

impl From<User> for UserRecord {
    fn from(value: User) -> Self {
        Self {
            user_id: *value.user_id.as_uuid(),
            email: value.email.into(),
            first_name: value.first_name.into(),
            last_name: value.last_name.into(),
            created_at: value.created_at,
            updated_at: value.updated_at,
            onboarding_complete: Some(value.onboarding_complete),
        }
    }
}

impl TryFrom<UserRecord> for User {
    type Error = UserValidationError;

    fn try_from(value: UserRecord) -> Result<Self, Self::Error> {
        if value.updated_at < value.created_at {
            return Err(UserValidationError::UpdatedBeforeCreated);
        }
        Ok(Self {
            user_id: UserId::from_uuid(value.user_id),
            email: EmailAddress::new(value.email)?,
            first_name: PersonName::new(value.first_name)?,
            last_name: PersonName::new(value.last_name)?,
            created_at: value.created_at,
            updated_at: value.updated_at,
            onboarding_complete: value.onboarding_complete.unwrap_or(false),
        })
    }
}

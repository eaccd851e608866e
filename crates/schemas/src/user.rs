//! User shape exchanged at API and form boundaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::fields::{normalise_email, normalise_person_name, parse_timestamp, parse_uuid};
use crate::reader::ObjectReader;
use crate::{Schema, SchemaError};

/// Validated user record.
///
/// Serialises with camelCase keys; `onboardingComplete` is omitted when
/// unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Stable user identifier.
    pub user_id: Uuid,
    /// Lower-cased email address.
    pub email: String,
    /// Trimmed given name.
    pub first_name: String,
    /// Trimmed family name.
    pub last_name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Whether onboarding has been completed, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_complete: Option<bool>,
}

/// Schema for [`UserRecord`].
///
/// # Examples
/// ```
/// use schemas::{Schema, UserSchema};
/// use serde_json::json;
///
/// let record = UserSchema::validate(&json!({
///     "userId": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
///     "email": "ada@example.com",
///     "firstName": "Ada",
///     "lastName": "Lovelace",
///     "createdAt": "2024-01-01T09:00:00Z",
///     "updatedAt": "2024-01-02T09:00:00Z"
/// }))
/// .expect("valid user");
/// assert_eq!(record.first_name, "Ada");
/// assert_eq!(record.onboarding_complete, None);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct UserSchema;

impl Schema for UserSchema {
    type Output = UserRecord;

    fn validate(input: &Value) -> Result<UserRecord, SchemaError> {
        let mut reader = ObjectReader::new(input)?;
        let user_id = reader.required_with("userId", parse_uuid);
        let email = reader.required_with("email", normalise_email);
        let first_name = reader.required_with("firstName", normalise_person_name);
        let last_name = reader.required_with("lastName", normalise_person_name);
        let created_at = reader.required_with("createdAt", parse_timestamp);
        let updated_at = reader.required_with("updatedAt", parse_timestamp);
        let onboarding_complete = reader.optional_bool("onboardingComplete");

        let record = (|| {
            Some(UserRecord {
                user_id: user_id?,
                email: email?,
                first_name: first_name?,
                last_name: last_name?,
                created_at: created_at?,
                updated_at: updated_at?,
                onboarding_complete,
            })
        })();
        reader.finish(record)
    }
}

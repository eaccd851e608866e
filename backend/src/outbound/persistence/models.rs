//! Internal Diesel row structs.
//!
//! Rows never leave the persistence module; repositories convert them to
//! domain types and report undecodable rows as query errors.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{checkins, plans, sessions, users};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row read from, or written to, `users`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub onboarding_complete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable user columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub onboarding_complete: bool,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

/// Row read from, or written to, `plans`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = plans)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PlanRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub milestones: serde_json::Value,
    pub current_stage: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable plan columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = plans)]
pub(crate) struct PlanChangeset<'a> {
    pub title: &'a str,
    pub milestones: &'a serde_json::Value,
    pub current_stage: i32,
    pub status: &'a str,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Check-ins
// ---------------------------------------------------------------------------

/// Row read from, or written to, `checkins`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = checkins)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CheckinRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub day: NaiveDate,
    pub energy: i16,
    pub mood: i16,
    pub sleep_hours: i16,
    pub activity_minutes: i16,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Answer columns; owner and day never change. `None` clears the note.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = checkins)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct CheckinChangeset<'a> {
    pub energy: i16,
    pub mood: i16,
    pub sleep_hours: i16,
    pub activity_minutes: i16,
    pub note: Option<&'a str>,
    pub recorded_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// Row read from, or written to, `sessions`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub state: String,
    pub code_hash: Option<String>,
    pub attempts: i16,
    pub verified_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Mutable session columns. `None` values overwrite with NULL.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = sessions)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct SessionChangeset<'a> {
    pub state: &'a str,
    pub code_hash: Option<&'a str>,
    pub attempts: i16,
    pub verified_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
}

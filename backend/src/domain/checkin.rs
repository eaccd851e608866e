//! Daily check-in entity and streak arithmetic.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use schemas::fields::{ACTIVITY_MINUTES_MAX, NOTE_MAX, SLEEP_HOURS_MAX, check_rating, normalise_note};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::UserId;

/// Errors raised when check-in answers fall outside their bounds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckinValidationError {
    /// Rating outside 1 to 5.
    #[error("{field} must be between 1 and 5")]
    Rating {
        /// Wire name of the offending answer.
        field: &'static str,
    },
    /// Sleep hours above the daily maximum.
    #[error("sleepHours must be at most {max}", max = SLEEP_HOURS_MAX)]
    SleepHours,
    /// Activity minutes above the daily maximum.
    #[error("activityMinutes must be at most {max}", max = ACTIVITY_MINUTES_MAX)]
    ActivityMinutes,
    /// Note longer than [`NOTE_MAX`] characters.
    #[error("note must be at most {max} characters", max = NOTE_MAX)]
    NoteTooLong,
}

impl CheckinValidationError {
    /// Wire name of the answer that failed.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Rating { field } => field,
            Self::SleepHours => "sleepHours",
            Self::ActivityMinutes => "activityMinutes",
            Self::NoteTooLong => "note",
        }
    }
}

/// Check-in identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckinId(Uuid);

impl CheckinId {
    /// Generate a new random identifier.
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

impl fmt::Display for CheckinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Self-reported score from 1 (low) to 5 (high).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    fn for_field(value: u8, field: &'static str) -> Result<Self, CheckinValidationError> {
        check_rating(value)
            .map(Self)
            .map_err(|_| CheckinValidationError::Rating { field })
    }

    /// Numeric value.
    pub const fn get(self) -> u8 {
        self.0
    }
}

/// Validated answers to the daily check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckinAnswers {
    #[schema(value_type = u8, minimum = 1, maximum = 5, example = 4)]
    energy: Rating,
    #[schema(value_type = u8, minimum = 1, maximum = 5, example = 3)]
    mood: Rating,
    #[schema(maximum = 24, example = 7)]
    sleep_hours: u8,
    #[schema(maximum = 1440, example = 30)]
    activity_minutes: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

impl CheckinAnswers {
    /// Validate raw answers. Blank notes become `None`.
    pub fn new(
        energy: u8,
        mood: u8,
        sleep_hours: u8,
        activity_minutes: u16,
        note: Option<&str>,
    ) -> Result<Self, CheckinValidationError> {
        let energy = Rating::for_field(energy, "energy")?;
        let mood = Rating::for_field(mood, "mood")?;
        if sleep_hours > SLEEP_HOURS_MAX {
            return Err(CheckinValidationError::SleepHours);
        }
        if activity_minutes > ACTIVITY_MINUTES_MAX {
            return Err(CheckinValidationError::ActivityMinutes);
        }
        let note = match note {
            Some(raw) => normalise_note(raw).map_err(|_| CheckinValidationError::NoteTooLong)?,
            None => None,
        };
        Ok(Self {
            energy,
            mood,
            sleep_hours,
            activity_minutes,
            note,
        })
    }

    /// Energy rating.
    pub fn energy(&self) -> Rating {
        self.energy
    }

    /// Mood rating.
    pub fn mood(&self) -> Rating {
        self.mood
    }

    /// Hours slept.
    pub fn sleep_hours(&self) -> u8 {
        self.sleep_hours
    }

    /// Minutes of activity.
    pub fn activity_minutes(&self) -> u16 {
        self.activity_minutes
    }

    /// Optional reflection.
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
}

/// A user's answers for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Checkin {
    #[schema(value_type = String)]
    checkin_id: CheckinId,
    #[schema(value_type = String)]
    user_id: UserId,
    #[schema(value_type = String, format = Date, example = "2024-05-06")]
    day: NaiveDate,
    answers: CheckinAnswers,
    recorded_at: DateTime<Utc>,
}

impl Checkin {
    /// Assemble a check-in from validated parts.
    pub fn new(
        id: CheckinId,
        user_id: UserId,
        day: NaiveDate,
        answers: CheckinAnswers,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            checkin_id: id,
            user_id,
            day,
            answers,
            recorded_at,
        }
    }

    /// Identifier.
    pub fn id(&self) -> &CheckinId {
        &self.checkin_id
    }

    /// Owner.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Day the answers describe.
    pub fn day(&self) -> NaiveDate {
        self.day
    }

    /// Validated answers.
    pub fn answers(&self) -> &CheckinAnswers {
        &self.answers
    }

    /// When the check-in was submitted.
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

/// Length of the run of consecutive check-in days ending today.
///
/// A run ending yesterday still counts so the streak does not reset before
/// the user has had a chance to check in today. Duplicate and future days
/// are ignored.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use retire_strong_backend::domain::current_streak;
///
/// let day = |d| NaiveDate::from_ymd_opt(2024, 5, d).expect("valid date");
/// assert_eq!(current_streak([day(4), day(5), day(6)], day(6)), 3);
/// assert_eq!(current_streak([day(4), day(5)], day(6)), 2);
/// assert_eq!(current_streak([day(3)], day(6)), 0);
/// ```
pub fn current_streak<I>(days: I, today: NaiveDate) -> u32
where
    I: IntoIterator<Item = NaiveDate>,
{
    let days: BTreeSet<NaiveDate> = days.into_iter().filter(|day| *day <= today).collect();

    let mut cursor = if days.contains(&today) {
        Some(today)
    } else {
        today.pred_opt().filter(|yesterday| days.contains(yesterday))
    };

    let mut streak = 0;
    while let Some(day) = cursor.filter(|day| days.contains(day)) {
        streak += 1;
        cursor = day.pred_opt();
    }
    streak
}

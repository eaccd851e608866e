//! Daily check-in submission shape.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fields::{
    ACTIVITY_MINUTES_MAX, RATING_MAX, RATING_MIN, SLEEP_HOURS_MAX, normalise_note, parse_date,
};
use crate::reader::ObjectReader;
use crate::{Schema, SchemaError};

/// Validated answers to the daily check-in form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinSubmission {
    /// Calendar day the answers describe.
    pub day: NaiveDate,
    /// Self-reported energy, 1 (low) to 5 (high).
    pub energy: u8,
    /// Self-reported mood, 1 (low) to 5 (high).
    pub mood: u8,
    /// Hours slept the previous night.
    pub sleep_hours: u8,
    /// Minutes of deliberate activity.
    pub activity_minutes: u16,
    /// Optional free-text reflection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Schema for [`CheckinSubmission`].
#[derive(Debug, Default, Clone, Copy)]
pub struct CheckinSchema;

fn rating_range() -> std::ops::RangeInclusive<i64> {
    i64::from(RATING_MIN)..=i64::from(RATING_MAX)
}

impl Schema for CheckinSchema {
    type Output = CheckinSubmission;

    fn validate(input: &Value) -> Result<CheckinSubmission, SchemaError> {
        let mut reader = ObjectReader::new(input)?;
        let day = reader.required_with("day", parse_date);
        let energy = reader.required_integer("energy", rating_range());
        let mood = reader.required_integer("mood", rating_range());
        let sleep_hours = reader.required_integer("sleepHours", 0..=i64::from(SLEEP_HOURS_MAX));
        let activity_minutes =
            reader.required_integer("activityMinutes", 0..=i64::from(ACTIVITY_MINUTES_MAX));
        let note = reader.optional_with("note", normalise_note);

        let record = (|| {
            Some(CheckinSubmission {
                day: day?,
                energy: u8::try_from(energy?).ok()?,
                mood: u8::try_from(mood?).ok()?,
                sleep_hours: u8::try_from(sleep_hours?).ok()?,
                activity_minutes: u16::try_from(activity_minutes?).ok()?,
                note,
            })
        })();
        reader.finish(record)
    }
}

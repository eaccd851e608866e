//! Reusable field validators shared by schemas and the domain model.
//!
//! Each validator normalises its input (trimming, case folding) and returns
//! the canonical value or the [`ViolationCode`] describing the failure.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use uuid::Uuid;

use crate::ViolationCode;

/// Maximum length of an email address, per RFC 5321.
pub const EMAIL_MAX: usize = 254;
/// Maximum length of a first or last name.
pub const PERSON_NAME_MAX: usize = 64;
/// Lowest accepted check-in rating.
pub const RATING_MIN: u8 = 1;
/// Highest accepted check-in rating.
pub const RATING_MAX: u8 = 5;
/// Highest accepted nightly sleep duration, in hours.
pub const SLEEP_HOURS_MAX: u8 = 24;
/// Highest accepted daily activity duration, in minutes.
pub const ACTIVITY_MINUTES_MAX: u16 = 1440;
/// Maximum length of a free-text check-in note.
pub const NOTE_MAX: usize = 500;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static PERSON_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"^[A-Za-z0-9._%+'\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)+$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn person_name_regex() -> &'static Regex {
    PERSON_NAME_RE.get_or_init(|| {
        // Length is enforced separately; this constrains the character set.
        let pattern = r"^\p{L}[\p{L}\p{M} '.\-]*$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("person name regex failed to compile: {error}"))
    })
}

/// Trim, validate, and lower-case an email address.
///
/// # Errors
/// [`ViolationCode::Empty`] for blank input, [`ViolationCode::TooLong`] past
/// [`EMAIL_MAX`] characters, and [`ViolationCode::InvalidEmail`] otherwise.
///
/// # Examples
/// ```
/// use schemas::fields::normalise_email;
///
/// assert_eq!(normalise_email(" Ada@Example.COM ").as_deref(), Ok("ada@example.com"));
/// assert!(normalise_email("not-an-email").is_err());
/// ```
pub fn normalise_email(raw: &str) -> Result<String, ViolationCode> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ViolationCode::Empty);
    }
    if trimmed.chars().count() > EMAIL_MAX {
        return Err(ViolationCode::TooLong);
    }
    if !email_regex().is_match(trimmed) {
        return Err(ViolationCode::InvalidEmail);
    }
    Ok(trimmed.to_lowercase())
}

/// Trim and validate a first or last name.
///
/// # Errors
/// [`ViolationCode::Empty`], [`ViolationCode::TooLong`], or
/// [`ViolationCode::InvalidCharacters`] when the name starts with something
/// other than a letter or contains symbols beyond spaces, apostrophes,
/// hyphens, and periods.
pub fn normalise_person_name(raw: &str) -> Result<String, ViolationCode> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ViolationCode::Empty);
    }
    if trimmed.chars().count() > PERSON_NAME_MAX {
        return Err(ViolationCode::TooLong);
    }
    if !person_name_regex().is_match(trimmed) {
        return Err(ViolationCode::InvalidCharacters);
    }
    Ok(trimmed.to_owned())
}

/// Normalise an optional check-in note; blank notes collapse to `None`.
///
/// # Errors
/// [`ViolationCode::TooLong`] past [`NOTE_MAX`] characters.
pub fn normalise_note(raw: &str) -> Result<Option<String>, ViolationCode> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > NOTE_MAX {
        return Err(ViolationCode::TooLong);
    }
    Ok(Some(trimmed.to_owned()))
}

/// Parse a hyphenated UUID without surrounding whitespace.
///
/// # Errors
/// [`ViolationCode::InvalidUuid`] when the input is not a UUID.
pub fn parse_uuid(raw: &str) -> Result<Uuid, ViolationCode> {
    if raw.trim() != raw {
        return Err(ViolationCode::InvalidUuid);
    }
    Uuid::parse_str(raw).map_err(|_| ViolationCode::InvalidUuid)
}

/// Parse an RFC 3339 timestamp and convert it to UTC.
///
/// # Errors
/// [`ViolationCode::InvalidTimestamp`] when parsing fails.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ViolationCode> {
    DateTime::parse_from_rfc3339(raw)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| ViolationCode::InvalidTimestamp)
}

/// Parse a `YYYY-MM-DD` calendar date.
///
/// # Errors
/// [`ViolationCode::InvalidDate`] when parsing fails.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ViolationCode> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ViolationCode::InvalidDate)
}

/// Check that a rating lies within [`RATING_MIN`]..=[`RATING_MAX`].
///
/// # Errors
/// [`ViolationCode::OutOfRange`] otherwise.
pub const fn check_rating(value: u8) -> Result<u8, ViolationCode> {
    if value < RATING_MIN || value > RATING_MAX {
        return Err(ViolationCode::OutOfRange);
    }
    Ok(value)
}

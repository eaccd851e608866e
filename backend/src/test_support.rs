//! Shared test doubles for unit tests.

use std::sync::Mutex;

use chrono::{DateTime, Local, NaiveDate, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{EmailAddress, NewUser, PersonName, User, UserId};

/// Timestamp most unit tests treat as "now".
pub fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 6, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// Calendar day of [`fixture_now`].
pub fn fixture_today() -> NaiveDate {
    fixture_now().date_naive()
}

/// Clock that only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: TimeDelta) {
        *self.lock_clock() += delta;
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// A registered user named Ada Lovelace.
pub fn sample_user(onboarded: bool) -> User {
    let mut user = User::register(
        UserId::random(),
        NewUser {
            email: EmailAddress::new("ada@example.com").expect("valid email"),
            first_name: PersonName::new("Ada").expect("valid name"),
            last_name: PersonName::new("Lovelace").expect("valid name"),
        },
        fixture_now(),
    );
    if onboarded {
        user.complete_onboarding(fixture_now());
    }
    user
}

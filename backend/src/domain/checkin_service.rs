//! Daily check-in use-cases.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{CheckinRepository, CheckinRepositoryError, CheckinService};
use crate::domain::{Checkin, CheckinAnswers, CheckinId, Error, UserId, current_streak};

/// Largest `limit` honoured by [`CheckinService::recent_checkins`].
pub const RECENT_CHECKINS_MAX: usize = 90;

/// [`CheckinService`] backed by a [`CheckinRepository`].
#[derive(Clone)]
pub struct CheckinServiceImpl<R: ?Sized> {
    checkins: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R: ?Sized> CheckinServiceImpl<R> {
    /// Create the service.
    pub fn new(checkins: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { checkins, clock }
    }
}

fn already_recorded(day: NaiveDate, today: NaiveDate) -> Error {
    if day == today {
        Error::conflict("checkin already recorded for today")
    } else {
        Error::conflict(format!("checkin already recorded for {day}"))
    }
}

#[async_trait]
impl<R> CheckinService for CheckinServiceImpl<R>
where
    R: CheckinRepository + ?Sized,
{
    async fn record_checkin(
        &self,
        user_id: &UserId,
        day: NaiveDate,
        answers: CheckinAnswers,
    ) -> Result<Checkin, Error> {
        let now = self.clock.utc();
        let today = now.date_naive();
        // One day of slack absorbs clients ahead of UTC.
        if today.checked_add_days(Days::new(1)).is_some_and(|limit| day > limit) {
            return Err(Error::invalid_request("checkin day is in the future")
                .with_details(serde_json::json!({ "field": "day", "code": "out_of_range" })));
        }
        if self.checkins.find_for_day(user_id, day).await?.is_some() {
            return Err(already_recorded(day, today));
        }

        let checkin = Checkin::new(CheckinId::random(), *user_id, day, answers, now);
        let saved = self.checkins.create(&checkin).await.map_err(|err| match err {
            CheckinRepositoryError::DuplicateDay { .. } => already_recorded(day, today),
            other => other.into(),
        })?;
        info!(user_id = %user_id, day = %day, "checkin recorded");
        Ok(saved)
    }

    async fn recent_checkins(&self, user_id: &UserId, limit: usize) -> Result<Vec<Checkin>, Error> {
        let limit = limit.clamp(1, RECENT_CHECKINS_MAX);
        Ok(self.checkins.list_recent(user_id, limit).await?)
    }

    async fn streak(&self, user_id: &UserId) -> Result<u32, Error> {
        let days = self.checkins.list_days(user_id).await?;
        Ok(current_streak(days, self.clock.utc().date_naive()))
    }
}

#[cfg(test)]
#[path = "checkin_service_tests.rs"]
mod tests;

//! Driving port for daily check-in use-cases.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{Checkin, CheckinAnswers, Error, UserId};

/// Use-cases over a user's check-ins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CheckinService: Send + Sync {
    /// Record answers for `day`. One check-in per user per day.
    async fn record_checkin(
        &self,
        user_id: &UserId,
        day: NaiveDate,
        answers: CheckinAnswers,
    ) -> Result<Checkin, Error>;

    /// Latest check-ins, newest first.
    async fn recent_checkins(&self, user_id: &UserId, limit: usize) -> Result<Vec<Checkin>, Error>;

    /// Consecutive days checked in up to today.
    async fn streak(&self, user_id: &UserId) -> Result<u32, Error>;
}

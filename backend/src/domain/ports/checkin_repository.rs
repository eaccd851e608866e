//! Driven port for check-in persistence.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{Checkin, CheckinId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by check-in repository adapters.
    pub enum CheckinRepositoryError {
        /// Storage could not be reached; the caller may retry.
        Connection { message: String } => "checkin repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "checkin repository query failed: {message}",
        /// The user already has a check-in for the day.
        DuplicateDay { day: String } => "a checkin for {day} already exists",
        /// An update targeted a check-in that does not exist.
        NotFound { checkin_id: String } => "checkin {checkin_id} does not exist",
    }
}

/// Port for reading and writing check-ins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CheckinRepository: Send + Sync {
    /// Insert a check-in, rejecting a second one for the same user and day.
    async fn create(&self, checkin: &Checkin) -> Result<Checkin, CheckinRepositoryError>;

    /// Replace a check-in's answers and recording time.
    async fn update(&self, checkin: &Checkin) -> Result<Checkin, CheckinRepositoryError>;

    /// Fetch a check-in by id.
    async fn find_by_id(&self, id: &CheckinId) -> Result<Option<Checkin>, CheckinRepositoryError>;

    /// Fetch the user's check-in for `day`.
    async fn find_for_day(
        &self,
        user_id: &UserId,
        day: NaiveDate,
    ) -> Result<Option<Checkin>, CheckinRepositoryError>;

    /// Most recent check-ins by day, newest first, at most `limit`.
    async fn list_recent(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<Checkin>, CheckinRepositoryError>;

    /// Every day the user checked in, newest first.
    async fn list_days(&self, user_id: &UserId) -> Result<Vec<NaiveDate>, CheckinRepositoryError>;

    /// Remove a check-in. Returns `false` when nothing was deleted.
    async fn delete(&self, id: &CheckinId) -> Result<bool, CheckinRepositoryError>;
}

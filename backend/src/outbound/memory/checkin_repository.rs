//! In-memory [`CheckinRepository`].

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::ports::{CheckinRepository, CheckinRepositoryError};
use crate::domain::{Checkin, CheckinId, UserId};

type Checkins = HashMap<CheckinId, Checkin>;

/// Check-ins held in a process-local map.
#[derive(Debug, Default)]
pub struct InMemoryCheckinRepository {
    checkins: RwLock<Checkins>,
}

impl InMemoryCheckinRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Checkins>, CheckinRepositoryError> {
        self.checkins
            .read()
            .map_err(|_| CheckinRepositoryError::query("checkin store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Checkins>, CheckinRepositoryError> {
        self.checkins
            .write()
            .map_err(|_| CheckinRepositoryError::query("checkin store lock poisoned"))
    }

    fn newest_first(&self, user_id: &UserId) -> Result<Vec<Checkin>, CheckinRepositoryError> {
        let mut owned: Vec<Checkin> = self
            .read()?
            .values()
            .filter(|checkin| checkin.user_id() == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.day().cmp(&a.day()));
        Ok(owned)
    }
}

#[async_trait]
impl CheckinRepository for InMemoryCheckinRepository {
    async fn create(&self, checkin: &Checkin) -> Result<Checkin, CheckinRepositoryError> {
        let mut checkins = self.write()?;
        let same_day = checkins
            .values()
            .any(|other| other.user_id() == checkin.user_id() && other.day() == checkin.day());
        if same_day {
            return Err(CheckinRepositoryError::duplicate_day(
                checkin.day().to_string(),
            ));
        }
        checkins.insert(*checkin.id(), checkin.clone());
        Ok(checkin.clone())
    }

    async fn update(&self, checkin: &Checkin) -> Result<Checkin, CheckinRepositoryError> {
        let mut checkins = self.write()?;
        // Owner and day are fixed once recorded.
        let slot = checkins
            .get_mut(checkin.id())
            .filter(|slot| slot.user_id() == checkin.user_id() && slot.day() == checkin.day())
            .ok_or_else(|| CheckinRepositoryError::not_found(checkin.id().to_string()))?;
        *slot = checkin.clone();
        Ok(checkin.clone())
    }

    async fn find_by_id(&self, id: &CheckinId) -> Result<Option<Checkin>, CheckinRepositoryError> {
        Ok(self.read()?.get(id).cloned())
    }

    async fn find_for_day(
        &self,
        user_id: &UserId,
        day: NaiveDate,
    ) -> Result<Option<Checkin>, CheckinRepositoryError> {
        Ok(self
            .read()?
            .values()
            .find(|checkin| checkin.user_id() == user_id && checkin.day() == day)
            .cloned())
    }

    async fn list_recent(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<Checkin>, CheckinRepositoryError> {
        let mut owned = self.newest_first(user_id)?;
        owned.truncate(limit);
        Ok(owned)
    }

    async fn list_days(&self, user_id: &UserId) -> Result<Vec<NaiveDate>, CheckinRepositoryError> {
        Ok(self
            .newest_first(user_id)?
            .iter()
            .map(Checkin::day)
            .collect())
    }

    async fn delete(&self, id: &CheckinId) -> Result<bool, CheckinRepositoryError> {
        Ok(self.write()?.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CheckinAnswers;
    use chrono::Utc;
    use rstest::rstest;

    fn checkin(user_id: UserId, day: u32) -> Checkin {
        let answers = CheckinAnswers::new(3, 3, 7, 20, None).expect("valid answers");
        let day = NaiveDate::from_ymd_opt(2024, 5, day).expect("valid date");
        Checkin::new(CheckinId::random(), user_id, day, answers, Utc::now())
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_id_reads_as_none() {
        let repo = InMemoryCheckinRepository::new();
        assert!(repo.find_by_id(&CheckinId::random()).await.expect("read").is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn same_day_twice_is_a_duplicate() {
        let repo = InMemoryCheckinRepository::new();
        let user_id = UserId::random();
        repo.create(&checkin(user_id, 6)).await.expect("first");
        let err = repo.create(&checkin(user_id, 6)).await.expect_err("second");
        assert_eq!(err, CheckinRepositoryError::duplicate_day("2024-05-06"));
        repo.create(&checkin(UserId::random(), 6))
            .await
            .expect("other users unaffected");
    }

    #[rstest]
    #[tokio::test]
    async fn recent_lists_newest_first_within_limit() {
        let repo = InMemoryCheckinRepository::new();
        let user_id = UserId::random();
        for day in [3, 5, 4] {
            repo.create(&checkin(user_id, day)).await.expect("create");
        }

        let recent = repo.list_recent(&user_id, 2).await.expect("list");
        let days: Vec<u32> = recent.iter().map(|c| chrono::Datelike::day(&c.day())).collect();
        assert_eq!(days, vec![5, 4]);
        assert_eq!(repo.list_days(&user_id).await.expect("days").len(), 3);
    }

    #[rstest]
    #[tokio::test]
    async fn update_replaces_answers() {
        let repo = InMemoryCheckinRepository::new();
        let stored = repo.create(&checkin(UserId::random(), 6)).await.expect("create");
        let answers = CheckinAnswers::new(5, 4, 8, 45, Some("Swim")).expect("valid answers");
        let revised = Checkin::new(
            *stored.id(),
            *stored.user_id(),
            stored.day(),
            answers,
            Utc::now(),
        );

        repo.update(&revised).await.expect("update");
        let read = repo
            .find_by_id(stored.id())
            .await
            .expect("read")
            .expect("present");
        assert_eq!(read, revised);
    }

    #[rstest]
    #[tokio::test]
    async fn update_of_missing_checkin_is_not_found() {
        let repo = InMemoryCheckinRepository::new();
        let missing = checkin(UserId::random(), 6);
        let err = repo.update(&missing).await.expect_err("missing");
        assert_eq!(err, CheckinRepositoryError::not_found(missing.id().to_string()));
    }
}

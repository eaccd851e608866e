//! PostgreSQL-backed [`CheckinRepository`].

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CheckinRepository, CheckinRepositoryError};
use crate::domain::{Checkin, CheckinAnswers, CheckinId, UserId};

use super::diesel_error_mapping::DieselFailure;
use super::models::{CheckinChangeset, CheckinRow};
use super::pool::DbPool;
use super::schema::checkins;

const USER_DAY_CONSTRAINT: &str = "checkins_user_day_key";

/// Diesel implementation of the check-in port.
#[derive(Debug, Clone)]
pub struct DieselCheckinRepository {
    pool: DbPool,
}

impl DieselCheckinRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(
    failure: impl Into<DieselFailure>,
    checkin: Option<&Checkin>,
) -> CheckinRepositoryError {
    match (failure.into(), checkin) {
        (failure, Some(checkin)) if failure.is_unique(USER_DAY_CONSTRAINT) => {
            CheckinRepositoryError::duplicate_day(checkin.day().to_string())
        }
        (DieselFailure::Connection(message), _) => CheckinRepositoryError::connection(message),
        (DieselFailure::UniqueViolation { constraint }, _) => {
            CheckinRepositoryError::query(format!(
                "unique constraint {} violated",
                constraint.as_deref().unwrap_or("unknown")
            ))
        }
        (DieselFailure::Query(message), _) => CheckinRepositoryError::query(message),
    }
}

fn row_to_checkin(row: CheckinRow) -> Result<Checkin, CheckinRepositoryError> {
    let invalid = |reason: String| {
        CheckinRepositoryError::query(format!("stored checkin {} is invalid: {reason}", row.id))
    };
    let small = |value: i16| u8::try_from(value).map_err(|err| invalid(err.to_string()));
    let answers = CheckinAnswers::new(
        small(row.energy)?,
        small(row.mood)?,
        small(row.sleep_hours)?,
        u16::try_from(row.activity_minutes).map_err(|err| invalid(err.to_string()))?,
        row.note.as_deref(),
    )
    .map_err(|err| invalid(err.to_string()))?;
    Ok(Checkin::new(
        CheckinId::from_uuid(row.id),
        UserId::from_uuid(row.user_id),
        row.day,
        answers,
        row.recorded_at,
    ))
}

fn checkin_to_row(checkin: &Checkin) -> CheckinRow {
    let answers = checkin.answers();
    CheckinRow {
        id: *checkin.id().as_uuid(),
        user_id: *checkin.user_id().as_uuid(),
        day: checkin.day(),
        energy: i16::from(answers.energy().get()),
        mood: i16::from(answers.mood().get()),
        sleep_hours: i16::from(answers.sleep_hours()),
        // Bounded to 1440 on construction.
        activity_minutes: i16::try_from(answers.activity_minutes()).unwrap_or(i16::MAX),
        note: answers.note().map(str::to_owned),
        recorded_at: checkin.recorded_at(),
    }
}

#[async_trait]
impl CheckinRepository for DieselCheckinRepository {
    async fn create(&self, checkin: &Checkin) -> Result<Checkin, CheckinRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err, None))?;
        let row = diesel::insert_into(checkins::table)
            .values(&checkin_to_row(checkin))
            .returning(CheckinRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_failure(err, Some(checkin)))?;
        row_to_checkin(row)
    }

    async fn update(&self, checkin: &Checkin) -> Result<Checkin, CheckinRepositoryError> {
        let row = checkin_to_row(checkin);
        let changes = CheckinChangeset {
            energy: row.energy,
            mood: row.mood,
            sleep_hours: row.sleep_hours,
            activity_minutes: row.activity_minutes,
            note: row.note.as_deref(),
            recorded_at: row.recorded_at,
        };
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err, None))?;
        let target = checkins::table
            .find(checkin.id().as_uuid())
            .filter(checkins::user_id.eq(checkin.user_id().as_uuid()))
            .filter(checkins::day.eq(checkin.day()));
        let row = diesel::update(target)
            .set(&changes)
            .returning(CheckinRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_failure(err, None))?
            .ok_or_else(|| CheckinRepositoryError::not_found(checkin.id().to_string()))?;
        row_to_checkin(row)
    }

    async fn find_by_id(&self, id: &CheckinId) -> Result<Option<Checkin>, CheckinRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err, None))?;
        checkins::table
            .find(id.as_uuid())
            .select(CheckinRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_failure(err, None))?
            .map(row_to_checkin)
            .transpose()
    }

    async fn find_for_day(
        &self,
        user_id: &UserId,
        day: NaiveDate,
    ) -> Result<Option<Checkin>, CheckinRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err, None))?;
        checkins::table
            .filter(checkins::user_id.eq(user_id.as_uuid()))
            .filter(checkins::day.eq(day))
            .select(CheckinRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_failure(err, None))?
            .map(row_to_checkin)
            .transpose()
    }

    async fn list_recent(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<Checkin>, CheckinRepositoryError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err, None))?;
        checkins::table
            .filter(checkins::user_id.eq(user_id.as_uuid()))
            .order(checkins::day.desc())
            .limit(limit)
            .select(CheckinRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_failure(err, None))?
            .into_iter()
            .map(row_to_checkin)
            .collect()
    }

    async fn list_days(&self, user_id: &UserId) -> Result<Vec<NaiveDate>, CheckinRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err, None))?;
        checkins::table
            .filter(checkins::user_id.eq(user_id.as_uuid()))
            .order(checkins::day.desc())
            .select(checkins::day)
            .load(&mut conn)
            .await
            .map_err(|err| map_failure(err, None))
    }

    async fn delete(&self, id: &CheckinId) -> Result<bool, CheckinRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err, None))?;
        let deleted = diesel::delete(checkins::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(|err| map_failure(err, None))?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixture_now, fixture_today};
    use rstest::{fixture, rstest};

    #[fixture]
    fn checkin() -> Checkin {
        let answers =
            CheckinAnswers::new(4, 3, 7, 1440, Some("Long garden day")).expect("valid answers");
        Checkin::new(
            CheckinId::random(),
            UserId::random(),
            fixture_today(),
            answers,
            fixture_now(),
        )
    }

    #[rstest]
    fn rows_convert_back_to_the_same_checkin(checkin: Checkin) {
        let restored = row_to_checkin(checkin_to_row(&checkin)).expect("valid row");
        assert_eq!(restored, checkin);
    }

    #[rstest]
    #[case(0)]
    #[case(-3)]
    fn out_of_range_rating_is_rejected(checkin: Checkin, #[case] energy: i16) {
        let mut row = checkin_to_row(&checkin);
        row.energy = energy;
        let err = row_to_checkin(row).expect_err("invalid rating");
        assert!(matches!(err, CheckinRepositoryError::Query { .. }));
    }

    #[rstest]
    fn day_constraint_maps_to_duplicate_day(checkin: Checkin) {
        let failure = DieselFailure::UniqueViolation {
            constraint: Some(USER_DAY_CONSTRAINT.to_owned()),
        };
        assert_eq!(
            map_failure(failure, Some(&checkin)),
            CheckinRepositoryError::duplicate_day(checkin.day().to_string())
        );
    }
}

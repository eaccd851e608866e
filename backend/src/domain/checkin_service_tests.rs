//! Tests for the check-in service.

use std::sync::Arc;

use mockall::predicate::{always, eq};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::MockCheckinRepository;
use crate::test_support::{MutableClock, fixture_now, fixture_today};

fn service(repo: MockCheckinRepository) -> CheckinServiceImpl<MockCheckinRepository> {
    CheckinServiceImpl::new(Arc::new(repo), Arc::new(MutableClock::new(fixture_now())))
}

#[fixture]
fn answers() -> CheckinAnswers {
    CheckinAnswers::new(4, 3, 7, 30, Some("Walked to the shops")).expect("valid answers")
}

fn days_ago(n: u64) -> NaiveDate {
    fixture_today()
        .checked_sub_days(Days::new(n))
        .expect("valid date")
}

#[rstest]
#[tokio::test]
async fn records_first_checkin_of_the_day(answers: CheckinAnswers) {
    let user_id = UserId::random();
    let mut repo = MockCheckinRepository::new();
    repo.expect_find_for_day()
        .with(eq(user_id), eq(fixture_today()))
        .return_once(|_, _| Ok(None));
    repo.expect_create()
        .times(1)
        .returning(|checkin| Ok(checkin.clone()));

    let checkin = service(repo)
        .record_checkin(&user_id, fixture_today(), answers)
        .await
        .expect("checkin recorded");
    assert_eq!(checkin.day(), fixture_today());
    assert_eq!(checkin.recorded_at(), fixture_now());
}

#[rstest]
#[tokio::test]
async fn second_checkin_for_today_conflicts(answers: CheckinAnswers) {
    let user_id = UserId::random();
    let existing = Checkin::new(
        CheckinId::random(),
        user_id,
        fixture_today(),
        answers.clone(),
        fixture_now(),
    );
    let mut repo = MockCheckinRepository::new();
    repo.expect_find_for_day()
        .return_once(move |_, _| Ok(Some(existing)));
    repo.expect_create().times(0);

    let err = service(repo)
        .record_checkin(&user_id, fixture_today(), answers)
        .await
        .expect_err("duplicate");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.message(), "checkin already recorded for today");
}

#[rstest]
#[tokio::test]
async fn racing_duplicate_from_storage_conflicts(answers: CheckinAnswers) {
    let mut repo = MockCheckinRepository::new();
    repo.expect_find_for_day().return_once(|_, _| Ok(None));
    repo.expect_create()
        .returning(|checkin| Err(CheckinRepositoryError::duplicate_day(checkin.day().to_string())));

    let err = service(repo)
        .record_checkin(&UserId::random(), days_ago(1), answers)
        .await
        .expect_err("duplicate");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(
        err.message(),
        format!("checkin already recorded for {}", days_ago(1))
    );
}

#[rstest]
#[tokio::test]
async fn far_future_day_is_rejected(answers: CheckinAnswers) {
    let mut repo = MockCheckinRepository::new();
    repo.expect_find_for_day().times(0);
    let day = fixture_today()
        .checked_add_days(Days::new(2))
        .expect("valid date");

    let err = service(repo)
        .record_checkin(&UserId::random(), day, answers)
        .await
        .expect_err("future day");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[case(0, 1)]
#[case(10, 10)]
#[case(500, RECENT_CHECKINS_MAX)]
#[tokio::test]
async fn recent_checkins_clamps_limit(#[case] requested: usize, #[case] expected: usize) {
    let mut repo = MockCheckinRepository::new();
    repo.expect_list_recent()
        .with(always(), eq(expected))
        .times(1)
        .returning(|_, _| Ok(Vec::new()));

    let listed = service(repo)
        .recent_checkins(&UserId::random(), requested)
        .await
        .expect("list succeeds");
    assert!(listed.is_empty());
}

#[rstest]
#[tokio::test]
async fn streak_counts_back_from_today() {
    let mut repo = MockCheckinRepository::new();
    repo.expect_list_days()
        .return_once(|_| Ok(vec![days_ago(0), days_ago(1), days_ago(2), days_ago(4)]));

    let streak = service(repo)
        .streak(&UserId::random())
        .await
        .expect("streak computed");
    assert_eq!(streak, 3);
}

#[rstest]
#[tokio::test]
async fn streak_surfaces_connection_failure() {
    let mut repo = MockCheckinRepository::new();
    repo.expect_list_days()
        .return_once(|_| Err(CheckinRepositoryError::connection("refused")));

    let err = service(repo)
        .streak(&UserId::random())
        .await
        .expect_err("unavailable");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

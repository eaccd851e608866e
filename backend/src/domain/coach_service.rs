//! Coach use-case.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{CheckinRepository, CoachService, PlanRepository, UserRepository};
use crate::domain::{CoachContext, CoachPrompt, CoachReply, Error, UserId, current_streak};

/// Check-ins considered when composing a reply.
const CONTEXT_CHECKINS: usize = 7;

/// [`CoachService`] reading the user's plan and check-ins.
#[derive(Clone)]
pub struct CoachServiceImpl<U: ?Sized, P: ?Sized, C: ?Sized> {
    users: Arc<U>,
    plans: Arc<P>,
    checkins: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<U: ?Sized, P: ?Sized, C: ?Sized> CoachServiceImpl<U, P, C> {
    /// Create the service.
    pub fn new(users: Arc<U>, plans: Arc<P>, checkins: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            plans,
            checkins,
            clock,
        }
    }
}

#[async_trait]
impl<U, P, C> CoachService for CoachServiceImpl<U, P, C>
where
    U: UserRepository + ?Sized,
    P: PlanRepository + ?Sized,
    C: CheckinRepository + ?Sized,
{
    async fn ask(&self, user_id: &UserId, prompt: CoachPrompt) -> Result<CoachReply, Error> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))?;
        if !user.onboarding_complete() {
            return Err(Error::forbidden(
                "complete onboarding before talking to the coach",
            ));
        }

        let active_plan = self.plans.find_active_for_user(user_id).await?;
        let recent_checkins = self.checkins.list_recent(user_id, CONTEXT_CHECKINS).await?;
        let days = self.checkins.list_days(user_id).await?;
        let today = self.clock.utc().date_naive();

        let context = CoachContext {
            first_name: user.first_name().to_string(),
            active_plan,
            recent_checkins,
            streak: current_streak(days, today),
            today,
        };
        let reply = CoachReply::compose(&prompt, &context);
        debug!(
            user_id = %user_id,
            suggestions = reply.suggestions.len(),
            "coach reply composed"
        );
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockCheckinRepository, MockPlanRepository, MockUserRepository};
    use crate::test_support::{MutableClock, fixture_now, fixture_today, sample_user};
    use rstest::rstest;

    type TestService =
        CoachServiceImpl<MockUserRepository, MockPlanRepository, MockCheckinRepository>;

    fn service(
        users: MockUserRepository,
        plans: MockPlanRepository,
        checkins: MockCheckinRepository,
    ) -> TestService {
        CoachServiceImpl::new(
            Arc::new(users),
            Arc::new(plans),
            Arc::new(checkins),
            Arc::new(MutableClock::new(fixture_now())),
        )
    }

    fn prompt() -> CoachPrompt {
        CoachPrompt::new("What should I do today?").expect("valid prompt")
    }

    #[rstest]
    #[tokio::test]
    async fn coach_requires_onboarding() {
        let user = sample_user(false);
        let id = *user.id();
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().return_once(move |_| Ok(Some(user)));
        let mut plans = MockPlanRepository::new();
        plans.expect_find_active_for_user().times(0);

        let err = service(users, plans, MockCheckinRepository::new())
            .ask(&id, prompt())
            .await
            .expect_err("not onboarded");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn reply_uses_streak_and_greets_user() {
        let user = sample_user(true);
        let id = *user.id();
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().return_once(move |_| Ok(Some(user)));
        let mut plans = MockPlanRepository::new();
        plans.expect_find_active_for_user().return_once(|_| Ok(None));
        let mut checkins = MockCheckinRepository::new();
        checkins
            .expect_list_recent()
            .return_once(|_, _| Ok(Vec::new()));
        checkins.expect_list_days().return_once(|_| {
            let today = fixture_today();
            Ok((0..3)
                .filter_map(|n| today.checked_sub_days(chrono::Days::new(n)))
                .collect())
        });

        let reply = service(users, plans, checkins)
            .ask(&id, prompt())
            .await
            .expect("reply composed");
        assert!(reply.message.starts_with("Hi Ada."));
        assert!(reply.message.contains("3 days in a row"));
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().return_once(|_| Ok(None));

        let err = service(users, MockPlanRepository::new(), MockCheckinRepository::new())
            .ask(&UserId::random(), prompt())
            .await
            .expect_err("missing user");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}

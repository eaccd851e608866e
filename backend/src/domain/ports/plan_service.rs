//! Driving port for plan use-cases.

use async_trait::async_trait;

use crate::domain::{Error, Plan, PlanDraft, PlanId, UserId};

/// Use-cases over a user's plans.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlanService: Send + Sync {
    /// Start a plan. Conflicts when the user already has an active one.
    async fn create_plan(&self, user_id: &UserId, draft: PlanDraft) -> Result<Plan, Error>;

    /// The user's active plan, if any.
    async fn active_plan(&self, user_id: &UserId) -> Result<Option<Plan>, Error>;

    /// All of the user's plans, newest first.
    async fn list_plans(&self, user_id: &UserId) -> Result<Vec<Plan>, Error>;

    /// Complete the current milestone of one of the user's plans.
    async fn advance_plan(&self, user_id: &UserId, plan_id: &PlanId) -> Result<Plan, Error>;
}

//! Driven port for plan persistence.

use async_trait::async_trait;

use crate::domain::{Plan, PlanId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by plan repository adapters.
    pub enum PlanRepositoryError {
        /// Storage could not be reached; the caller may retry.
        Connection { message: String } => "plan repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "plan repository query failed: {message}",
        /// Storage already holds an active plan for the owner.
        ActivePlanExists { user_id: String } => "user {user_id} already has an active plan",
        /// An update targeted a plan that does not exist.
        NotFound { plan_id: String } => "plan {plan_id} does not exist",
    }
}

/// Port for reading and writing plans.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Insert a new plan.
    async fn create(&self, plan: &Plan) -> Result<Plan, PlanRepositoryError>;

    /// Replace an existing plan's progress.
    async fn update(&self, plan: &Plan) -> Result<Plan, PlanRepositoryError>;

    /// Fetch a plan by id.
    async fn find_by_id(&self, id: &PlanId) -> Result<Option<Plan>, PlanRepositoryError>;

    /// Fetch the owner's active plan, if any.
    async fn find_active_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Plan>, PlanRepositoryError>;

    /// List the owner's plans, newest first.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Plan>, PlanRepositoryError>;

    /// Remove a plan. Returns `false` when nothing was deleted.
    async fn delete(&self, id: &PlanId) -> Result<bool, PlanRepositoryError>;
}

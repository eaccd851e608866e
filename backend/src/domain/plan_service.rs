//! Plan use-cases.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{PlanRepository, PlanRepositoryError, PlanService};
use crate::domain::{Error, Plan, PlanDraft, PlanId, PlanProgressError, UserId};

/// [`PlanService`] backed by a [`PlanRepository`].
#[derive(Clone)]
pub struct PlanServiceImpl<R: ?Sized> {
    plans: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R: ?Sized> PlanServiceImpl<R> {
    /// Create the service.
    pub fn new(plans: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { plans, clock }
    }
}

fn plan_not_found(plan_id: &PlanId) -> Error {
    Error::not_found(format!("plan {plan_id} not found"))
}

#[async_trait]
impl<R> PlanService for PlanServiceImpl<R>
where
    R: PlanRepository + ?Sized,
{
    async fn create_plan(&self, user_id: &UserId, draft: PlanDraft) -> Result<Plan, Error> {
        if self.plans.find_active_for_user(user_id).await?.is_some() {
            return Err(Error::conflict("an active plan already exists"));
        }
        let plan = Plan::start(PlanId::random(), *user_id, draft, self.clock.utc());
        let created = self.plans.create(&plan).await?;
        info!(user_id = %user_id, plan_id = %created.id(), "plan created");
        Ok(created)
    }

    async fn active_plan(&self, user_id: &UserId) -> Result<Option<Plan>, Error> {
        Ok(self.plans.find_active_for_user(user_id).await?)
    }

    async fn list_plans(&self, user_id: &UserId) -> Result<Vec<Plan>, Error> {
        Ok(self.plans.list_for_user(user_id).await?)
    }

    async fn advance_plan(&self, user_id: &UserId, plan_id: &PlanId) -> Result<Plan, Error> {
        // Plans owned by someone else are indistinguishable from missing ones.
        let mut plan = self
            .plans
            .find_by_id(plan_id)
            .await?
            .filter(|plan| plan.user_id() == user_id)
            .ok_or_else(|| plan_not_found(plan_id))?;

        plan.advance(self.clock.utc()).map_err(|err| match err {
            PlanProgressError::AlreadyCompleted => Error::conflict("plan is already completed"),
        })?;

        let saved = self.plans.update(&plan).await.map_err(|err| match err {
            PlanRepositoryError::NotFound { .. } => plan_not_found(plan_id),
            other => other.into(),
        })?;
        info!(
            plan_id = %plan_id,
            stage = saved.current_stage(),
            status = saved.status().as_str(),
            "plan advanced"
        );
        Ok(saved)
    }
}

#[cfg(test)]
#[path = "plan_service_tests.rs"]
mod tests;

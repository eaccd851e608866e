//! In-memory [`PlanRepository`].

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::domain::ports::{PlanRepository, PlanRepositoryError};
use crate::domain::{Plan, PlanId, UserId};

/// Plans held in a process-local map.
#[derive(Debug, Default)]
pub struct InMemoryPlanRepository {
    plans: RwLock<HashMap<PlanId, Plan>>,
}

impl InMemoryPlanRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<PlanId, Plan>>, PlanRepositoryError> {
        self.plans
            .read()
            .map_err(|_| PlanRepositoryError::query("plan store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<PlanId, Plan>>, PlanRepositoryError> {
        self.plans
            .write()
            .map_err(|_| PlanRepositoryError::query("plan store lock poisoned"))
    }
}

fn other_active_plan(plans: &HashMap<PlanId, Plan>, plan: &Plan) -> bool {
    plan.is_active()
        && plans.values().any(|other| {
            other.is_active() && other.user_id() == plan.user_id() && other.id() != plan.id()
        })
}

#[async_trait]
impl PlanRepository for InMemoryPlanRepository {
    async fn create(&self, plan: &Plan) -> Result<Plan, PlanRepositoryError> {
        let mut plans = self.write()?;
        if other_active_plan(&plans, plan) {
            return Err(PlanRepositoryError::active_plan_exists(
                plan.user_id().to_string(),
            ));
        }
        if plans.contains_key(plan.id()) {
            return Err(PlanRepositoryError::query(format!(
                "plan {} already exists",
                plan.id()
            )));
        }
        plans.insert(*plan.id(), plan.clone());
        Ok(plan.clone())
    }

    async fn update(&self, plan: &Plan) -> Result<Plan, PlanRepositoryError> {
        let mut plans = self.write()?;
        if other_active_plan(&plans, plan) {
            return Err(PlanRepositoryError::active_plan_exists(
                plan.user_id().to_string(),
            ));
        }
        let slot = plans
            .get_mut(plan.id())
            .ok_or_else(|| PlanRepositoryError::not_found(plan.id().to_string()))?;
        *slot = plan.clone();
        Ok(plan.clone())
    }

    async fn find_by_id(&self, id: &PlanId) -> Result<Option<Plan>, PlanRepositoryError> {
        Ok(self.read()?.get(id).cloned())
    }

    async fn find_active_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Plan>, PlanRepositoryError> {
        Ok(self
            .read()?
            .values()
            .find(|plan| plan.user_id() == user_id && plan.is_active())
            .cloned())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Plan>, PlanRepositoryError> {
        let mut plans: Vec<Plan> = self
            .read()?
            .values()
            .filter(|plan| plan.user_id() == user_id)
            .cloned()
            .collect();
        plans.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(plans)
    }

    async fn delete(&self, id: &PlanId) -> Result<bool, PlanRepositoryError> {
        Ok(self.write()?.remove(id).is_some())
    }
}

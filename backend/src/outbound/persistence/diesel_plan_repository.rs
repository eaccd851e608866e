//! PostgreSQL-backed [`PlanRepository`].
//!
//! Milestones are stored as a JSONB array. `status` is written for the
//! partial unique index and checked against the rehydrated plan on read.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PlanRepository, PlanRepositoryError};
use crate::domain::{Milestone, Plan, PlanId, PlanParts, UserId};

use super::diesel_error_mapping::DieselFailure;
use super::models::{PlanChangeset, PlanRow};
use super::pool::DbPool;
use super::schema::plans;

const ACTIVE_PLAN_INDEX: &str = "plans_one_active_per_user";

/// Diesel implementation of the plan port.
#[derive(Debug, Clone)]
pub struct DieselPlanRepository {
    pool: DbPool,
}

impl DieselPlanRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: impl Into<DieselFailure>, plan: Option<&Plan>) -> PlanRepositoryError {
    match (failure.into(), plan) {
        (failure, Some(plan)) if failure.is_unique(ACTIVE_PLAN_INDEX) => {
            PlanRepositoryError::active_plan_exists(plan.user_id().to_string())
        }
        (DieselFailure::Connection(message), _) => PlanRepositoryError::connection(message),
        (DieselFailure::UniqueViolation { constraint }, _) => PlanRepositoryError::query(format!(
            "unique constraint {} violated",
            constraint.as_deref().unwrap_or("unknown")
        )),
        (DieselFailure::Query(message), _) => PlanRepositoryError::query(message),
    }
}

fn decode_error(plan_id: uuid::Uuid, reason: impl std::fmt::Display) -> PlanRepositoryError {
    PlanRepositoryError::query(format!("stored plan {plan_id} is invalid: {reason}"))
}

fn row_to_plan(row: PlanRow) -> Result<Plan, PlanRepositoryError> {
    let milestones: Vec<Milestone> =
        serde_json::from_value(row.milestones).map_err(|err| decode_error(row.id, err))?;
    let current_stage =
        usize::try_from(row.current_stage).map_err(|err| decode_error(row.id, err))?;
    let plan = Plan::restore(PlanParts {
        id: PlanId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        title: row.title,
        milestones,
        current_stage,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
    .map_err(|err| decode_error(row.id, err))?;

    if plan.status().as_str() != row.status {
        return Err(decode_error(
            row.id,
            format!("status {} disagrees with milestones", row.status),
        ));
    }
    Ok(plan)
}

struct EncodedPlan {
    milestones: serde_json::Value,
    current_stage: i32,
}

fn encode(plan: &Plan) -> Result<EncodedPlan, PlanRepositoryError> {
    let milestones = serde_json::to_value(plan.milestones())
        .map_err(|err| PlanRepositoryError::query(format!("encode milestones: {err}")))?;
    let current_stage = i32::try_from(plan.current_stage())
        .map_err(|err| PlanRepositoryError::query(format!("encode stage: {err}")))?;
    Ok(EncodedPlan {
        milestones,
        current_stage,
    })
}

#[async_trait]
impl PlanRepository for DieselPlanRepository {
    async fn create(&self, plan: &Plan) -> Result<Plan, PlanRepositoryError> {
        let encoded = encode(plan)?;
        let row = PlanRow {
            id: *plan.id().as_uuid(),
            user_id: *plan.user_id().as_uuid(),
            title: plan.title().to_owned(),
            milestones: encoded.milestones,
            current_stage: encoded.current_stage,
            status: plan.status().as_str().to_owned(),
            created_at: plan.created_at(),
            updated_at: plan.updated_at(),
        };
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err, None))?;
        let stored = diesel::insert_into(plans::table)
            .values(&row)
            .returning(PlanRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_failure(err, Some(plan)))?;
        row_to_plan(stored)
    }

    async fn update(&self, plan: &Plan) -> Result<Plan, PlanRepositoryError> {
        let encoded = encode(plan)?;
        let changes = PlanChangeset {
            title: plan.title(),
            milestones: &encoded.milestones,
            current_stage: encoded.current_stage,
            status: plan.status().as_str(),
            updated_at: plan.updated_at(),
        };
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err, None))?;
        let stored = diesel::update(plans::table.find(plan.id().as_uuid()))
            .set(&changes)
            .returning(PlanRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_failure(err, Some(plan)))?
            .ok_or_else(|| PlanRepositoryError::not_found(plan.id().to_string()))?;
        row_to_plan(stored)
    }

    async fn find_by_id(&self, id: &PlanId) -> Result<Option<Plan>, PlanRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err, None))?;
        plans::table
            .find(id.as_uuid())
            .select(PlanRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_failure(err, None))?
            .map(row_to_plan)
            .transpose()
    }

    async fn find_active_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Plan>, PlanRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err, None))?;
        plans::table
            .filter(plans::user_id.eq(user_id.as_uuid()))
            .filter(plans::status.eq("active"))
            .select(PlanRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_failure(err, None))?
            .map(row_to_plan)
            .transpose()
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Plan>, PlanRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err, None))?;
        plans::table
            .filter(plans::user_id.eq(user_id.as_uuid()))
            .order(plans::created_at.desc())
            .select(PlanRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_failure(err, None))?
            .into_iter()
            .map(row_to_plan)
            .collect()
    }

    async fn delete(&self, id: &PlanId) -> Result<bool, PlanRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err, None))?;
        let deleted = diesel::delete(plans::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(|err| map_failure(err, None))?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PlanDraft;
    use crate::test_support::fixture_now;
    use rstest::{fixture, rstest};

    #[fixture]
    fn plan() -> Plan {
        let draft =
            PlanDraft::new("Stronger legs", ["Sit to stand", "Stairs"]).expect("valid draft");
        Plan::start(PlanId::random(), UserId::random(), draft, fixture_now())
    }

    fn to_row(plan: &Plan) -> PlanRow {
        let encoded = encode(plan).expect("encodable");
        PlanRow {
            id: *plan.id().as_uuid(),
            user_id: *plan.user_id().as_uuid(),
            title: plan.title().to_owned(),
            milestones: encoded.milestones,
            current_stage: encoded.current_stage,
            status: plan.status().as_str().to_owned(),
            created_at: plan.created_at(),
            updated_at: plan.updated_at(),
        }
    }

    #[rstest]
    fn advanced_plan_survives_storage(mut plan: Plan) {
        plan.advance(fixture_now()).expect("advance");
        let restored = row_to_plan(to_row(&plan)).expect("valid row");
        assert_eq!(restored, plan);
    }

    #[rstest]
    fn status_mismatch_is_rejected(plan: Plan) {
        let mut row = to_row(&plan);
        row.status = "completed".to_owned();
        let err = row_to_plan(row).expect_err("inconsistent status");
        assert!(matches!(err, PlanRepositoryError::Query { .. }));
    }

    #[rstest]
    fn negative_stage_is_rejected(plan: Plan) {
        let mut row = to_row(&plan);
        row.current_stage = -1;
        assert!(row_to_plan(row).is_err());
    }

    #[rstest]
    fn active_index_maps_to_active_plan_exists(plan: Plan) {
        let failure = DieselFailure::UniqueViolation {
            constraint: Some(ACTIVE_PLAN_INDEX.to_owned()),
        };
        assert_eq!(
            map_failure(failure, Some(&plan)),
            PlanRepositoryError::active_plan_exists(plan.user_id().to_string())
        );
    }
}

//! Wellness plan endpoints.
//!
//! ```text
//! GET  /api/v1/plans
//! POST /api/v1/plans {"title":"Stronger legs","milestones":["Chair squats","Stairs"]}
//! GET  /api/v1/plans/active
//! POST /api/v1/plans/{planId}/advance
//! ```

use actix_web::{HttpResponse, get, post, web};
use schemas::ViolationCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Error, Plan, PlanDraft, PlanId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_user;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{field_error, plan_error};

/// Body for `POST /api/v1/plans`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreatePlanRequest {
    #[serde(default)]
    #[schema(example = "Stronger legs")]
    pub title: Option<String>,
    #[serde(default)]
    #[schema(example = json!(["Chair squats", "Climb two flights of stairs"]))]
    pub milestones: Option<Vec<String>>,
}

impl CreatePlanRequest {
    fn into_draft(self) -> Result<PlanDraft, Error> {
        let title = self
            .title
            .ok_or_else(|| field_error("title", ViolationCode::Required, "title is required"))?;
        let milestones = self.milestones.ok_or_else(|| {
            field_error("milestones", ViolationCode::Required, "milestones is required")
        })?;
        PlanDraft::new(&title, milestones).map_err(|err| plan_error(&err))
    }
}

fn parse_plan_id(raw: &str) -> Result<PlanId, Error> {
    Uuid::parse_str(raw)
        .map(PlanId::from_uuid)
        .map_err(|_| field_error("planId", ViolationCode::InvalidUuid, "planId must be a valid UUID"))
}

/// Plans owned by the signed-in user, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/plans",
    responses(
        (status = 200, description = "Plans", body = [Plan]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["plans"],
    operation_id = "listPlans"
)]
#[get("/plans")]
pub async fn list_plans(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Plan>>> {
    let user_id = require_user(&state, &session).await?;
    Ok(web::Json(state.plans.list_plans(&user_id).await?))
}

/// Start a plan. Only one plan may be active at a time.
#[utoipa::path(
    post,
    path = "/api/v1/plans",
    request_body = CreatePlanRequest,
    responses(
        (status = 201, description = "Plan started", body = Plan),
        (status = 400, description = "Invalid plan", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "An active plan already exists", body = Error)
    ),
    tags = ["plans"],
    operation_id = "createPlan"
)]
#[post("/plans")]
pub async fn create_plan(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreatePlanRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = require_user(&state, &session).await?;
    let draft = payload.into_inner().into_draft()?;
    let plan = state.plans.create_plan(&user_id, draft).await?;
    Ok(HttpResponse::Created().json(plan))
}

/// The active plan, or `null` when none is in progress.
#[utoipa::path(
    get,
    path = "/api/v1/plans/active",
    responses(
        (status = 200, description = "Active plan or null", body = Option<Plan>),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["plans"],
    operation_id = "activePlan"
)]
#[get("/plans/active")]
pub async fn active_plan(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Option<Plan>>> {
    let user_id = require_user(&state, &session).await?;
    Ok(web::Json(state.plans.active_plan(&user_id).await?))
}

/// Complete the next milestone.
#[utoipa::path(
    post,
    path = "/api/v1/plans/{planId}/advance",
    params(("planId" = String, Path, description = "Plan identifier")),
    responses(
        (status = 200, description = "Plan after advancing", body = Plan),
        (status = 400, description = "Malformed plan id", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No such plan for this user", body = Error),
        (status = 409, description = "Plan already completed", body = Error)
    ),
    tags = ["plans"],
    operation_id = "advancePlan"
)]
#[post("/plans/{plan_id}/advance")]
pub async fn advance_plan(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Plan>> {
    let user_id = require_user(&state, &session).await?;
    let plan_id = parse_plan_id(&path.into_inner())?;
    Ok(web::Json(state.plans.advance_plan(&user_id, &plan_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{TestBackend, signed_in, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    async fn json_body(response: actix_web::dev::ServiceResponse) -> Value {
        let body = actix_test::read_body(response).await;
        serde_json::from_slice(&body).expect("JSON body")
    }

    #[rstest]
    #[actix_web::test]
    async fn plan_lifecycle_runs_to_completion() {
        let backend = TestBackend::new();
        let app = actix_test::init_service(test_app(backend.state.clone())).await;
        let cookie = signed_in(&app, &backend, "ada@example.com").await;

        let created = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/plans")
                .cookie(cookie.clone())
                .set_json(json!({ "title": "Stronger legs", "milestones": ["Chair squats", "Stairs"] }))
                .to_request(),
        )
        .await;
        assert_eq!(created.status(), StatusCode::CREATED);
        let plan = json_body(created).await;
        assert_eq!(plan["status"], "active");
        assert_eq!(plan["currentStage"], 0);
        let plan_id = plan["planId"].as_str().expect("plan id").to_owned();

        let mut last = Value::Null;
        for _ in 0..2 {
            let response = actix_test::call_service(
                &app,
                actix_test::TestRequest::post()
                    .uri(&format!("/api/v1/plans/{plan_id}/advance"))
                    .cookie(cookie.clone())
                    .to_request(),
            )
            .await;
            assert_eq!(response.status(), StatusCode::OK);
            last = json_body(response).await;
        }
        assert_eq!(last["status"], "completed");

        let again = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/plans/{plan_id}/advance"))
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(again.status(), StatusCode::CONFLICT);

        let active = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/plans/active")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(active.status(), StatusCode::OK);
        assert_eq!(json_body(active).await, Value::Null);
    }

    #[rstest]
    #[actix_web::test]
    async fn second_active_plan_conflicts() {
        let backend = TestBackend::new();
        let app = actix_test::init_service(test_app(backend.state.clone())).await;
        let cookie = signed_in(&app, &backend, "ada@example.com").await;
        let body = json!({ "title": "Walk more", "milestones": ["Ten minutes"] });

        let mut statuses = Vec::new();
        for _ in 0..2 {
            let response = actix_test::call_service(
                &app,
                actix_test::TestRequest::post()
                    .uri("/api/v1/plans")
                    .cookie(cookie.clone())
                    .set_json(&body)
                    .to_request(),
            )
            .await;
            statuses.push(response.status());
        }
        assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::CONFLICT]);
    }

    #[rstest]
    #[case(json!({ "milestones": ["a"] }), "title", "required", None)]
    #[case(json!({ "title": "Plan", "milestones": [] }), "milestones", "empty", None)]
    #[case(json!({ "title": "Plan", "milestones": ["ok", "  "] }), "milestones", "empty", Some(1))]
    #[actix_web::test]
    async fn invalid_plans_name_the_failing_field(
        #[case] body: Value,
        #[case] field: &str,
        #[case] code: &str,
        #[case] index: Option<u64>,
    ) {
        let backend = TestBackend::new();
        let app = actix_test::init_service(test_app(backend.state.clone())).await;
        let cookie = signed_in(&app, &backend, "ada@example.com").await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/plans")
                .cookie(cookie)
                .set_json(body)
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let value = json_body(response).await;
        assert_eq!(value["details"]["field"], field);
        assert_eq!(value["details"]["code"], code);
        assert_eq!(value["details"]["index"].as_u64(), index);
    }

    #[rstest]
    #[case("not-a-uuid", StatusCode::BAD_REQUEST)]
    #[case("5b3c1d0e-2f4a-4c2e-9d61-0f1e2d3c4b5a", StatusCode::NOT_FOUND)]
    #[actix_web::test]
    async fn advancing_unknown_plans_fails(#[case] plan_id: &str, #[case] expected: StatusCode) {
        let backend = TestBackend::new();
        let app = actix_test::init_service(test_app(backend.state.clone())).await;
        let cookie = signed_in(&app, &backend, "ada@example.com").await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/plans/{plan_id}/advance"))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), expected);
    }
}

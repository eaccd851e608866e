//! Daily check-in endpoints.
//!
//! ```text
//! GET  /api/v1/checkins?limit=7
//! POST /api/v1/checkins {"day":"2024-05-06","energy":4,"mood":3,"sleepHours":7,"activityMinutes":30}
//! GET  /api/v1/checkins/streak
//! ```

use actix_web::{HttpResponse, get, post, web};
use schemas::{CheckinSchema, Schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Checkin, CheckinAnswers, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_user;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{checkin_error, schema_error};

/// Check-ins returned when no `limit` is given.
pub const DEFAULT_CHECKIN_LIMIT: usize = 14;

/// Query for `GET /api/v1/checkins`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListCheckinsQuery {
    /// Maximum entries, newest first; clamped to 1..=90.
    pub limit: Option<usize>,
}

/// Current run of consecutive check-in days.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StreakResponse {
    #[schema(example = 4)]
    pub streak: u32,
}

/// Recent check-ins, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/checkins",
    params(ListCheckinsQuery),
    responses(
        (status = 200, description = "Check-ins", body = [Checkin]),
        (status = 400, description = "Malformed query", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["checkins"],
    operation_id = "listCheckins"
)]
#[get("/checkins")]
pub async fn list_checkins(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListCheckinsQuery>,
) -> ApiResult<web::Json<Vec<Checkin>>> {
    let user_id = require_user(&state, &session).await?;
    let limit = query.limit.unwrap_or(DEFAULT_CHECKIN_LIMIT);
    Ok(web::Json(
        state.checkins.recent_checkins(&user_id, limit).await?,
    ))
}

/// Record the answers for one day.
///
/// The body is validated field by field; every violation is reported at
/// once and unknown keys are ignored.
#[utoipa::path(
    post,
    path = "/api/v1/checkins",
    request_body(content = Object, description = "day, energy, mood, sleepHours, activityMinutes, note?"),
    responses(
        (status = 201, description = "Check-in recorded", body = Checkin),
        (status = 400, description = "Invalid answers or future day", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "Already recorded for that day", body = Error)
    ),
    tags = ["checkins"],
    operation_id = "recordCheckin"
)]
#[post("/checkins")]
pub async fn record_checkin(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let user_id = require_user(&state, &session).await?;
    let submission = CheckinSchema::validate(&payload).map_err(|err| schema_error(&err))?;
    let answers = CheckinAnswers::new(
        submission.energy,
        submission.mood,
        submission.sleep_hours,
        submission.activity_minutes,
        submission.note.as_deref(),
    )
    .map_err(|err| checkin_error(&err))?;

    let checkin = state
        .checkins
        .record_checkin(&user_id, submission.day, answers)
        .await?;
    Ok(HttpResponse::Created().json(checkin))
}

/// Consecutive days with a check-in, ending today or yesterday.
#[utoipa::path(
    get,
    path = "/api/v1/checkins/streak",
    responses(
        (status = 200, description = "Current streak", body = StreakResponse),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["checkins"],
    operation_id = "checkinStreak"
)]
#[get("/checkins/streak")]
pub async fn streak(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<StreakResponse>> {
    let user_id = require_user(&state, &session).await?;
    let streak = state.checkins.streak(&user_id).await?;
    Ok(web::Json(StreakResponse { streak }))
}

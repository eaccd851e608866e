//! Coach conversation endpoint.

use actix_web::{post, web};
use schemas::ViolationCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CoachPrompt, CoachReply, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_user;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{coach_prompt_error, field_error};
use crate::inbound::http::{Submission, unpack};

/// Body for `POST /api/v1/coach/messages`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CoachMessageRequest {
    #[serde(default)]
    #[schema(example = "How can I sleep better?")]
    pub message: Option<String>,
}

/// Ask the coach a question.
///
/// Replies draw on the active plan and recent check-ins.
#[utoipa::path(
    post,
    path = "/api/v1/coach/messages",
    request_body = CoachMessageRequest,
    responses(
        (status = 200, description = "Coach reply", body = CoachReply),
        (status = 400, description = "Empty or overlong message", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Onboarding not complete", body = Error)
    ),
    tags = ["coach"],
    operation_id = "sendCoachMessage"
)]
#[post("/coach/messages")]
pub async fn send_message(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: Submission<CoachMessageRequest>,
) -> ApiResult<web::Json<CoachReply>> {
    let user_id = require_user(&state, &session).await?;
    let (request, _) = unpack(payload);
    let raw = request
        .message
        .ok_or_else(|| field_error("message", ViolationCode::Required, "message is required"))?;
    let prompt = CoachPrompt::new(&raw).map_err(|err| coach_prompt_error(&err))?;
    Ok(web::Json(state.coach.ask(&user_id, prompt).await?))
}

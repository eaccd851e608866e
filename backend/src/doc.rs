//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every `/api/v1` handler, the health probes, and the
//! DTO schemas, plus the session cookie security scheme. Swagger UI serves it
//! in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    Checkin, CheckinAnswers, CoachReply, Error, ErrorCode, Milestone, Plan, PlanStatus, User,
};
use crate::inbound::http::auth::{
    LoginRequest, PendingLoginResponse, SessionResponse, SignupRequest, VerifyRequest,
};
use crate::inbound::http::checkins::StreakResponse;
use crate::inbound::http::coach::CoachMessageRequest;
use crate::inbound::http::plans::CreatePlanRequest;
use crate::inbound::http::users::UpdateNamesRequest;

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/verify.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Retire Strong API",
        description = "Passwordless accounts, wellness plans, daily check-ins and the coach."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::sign_up,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::verify,
        crate::inbound::http::auth::logout,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_current_user,
        crate::inbound::http::users::complete_onboarding,
        crate::inbound::http::plans::list_plans,
        crate::inbound::http::plans::create_plan,
        crate::inbound::http::plans::active_plan,
        crate::inbound::http::plans::advance_plan,
        crate::inbound::http::checkins::list_checkins,
        crate::inbound::http::checkins::record_checkin,
        crate::inbound::http::checkins::streak,
        crate::inbound::http::coach::send_message,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        Plan,
        PlanStatus,
        Milestone,
        Checkin,
        CheckinAnswers,
        CoachReply,
        SignupRequest,
        LoginRequest,
        VerifyRequest,
        PendingLoginResponse,
        SessionResponse,
        UpdateNamesRequest,
        CreatePlanRequest,
        StreakResponse,
        CoachMessageRequest,
    )),
    tags(
        (name = "auth", description = "Passwordless sign-up and login"),
        (name = "users", description = "Account profile and onboarding"),
        (name = "plans", description = "Wellness plans and milestones"),
        (name = "checkins", description = "Daily check-ins and streaks"),
        (name = "coach", description = "Coach conversation"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

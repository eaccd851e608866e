//! Passwordless authentication endpoints.
//!
//! ```text
//! POST /api/v1/signup {"email":"ada@example.com","firstName":"Ada","lastName":"Lovelace"}
//! POST /api/v1/login  {"email":"ada@example.com"}
//! POST /api/v1/verify {"code":"123456"}
//! POST /api/v1/logout
//! ```
//!
//! Each endpoint also accepts the URL-encoded submissions of the page forms
//! and answers those with a `303 See Other` to the next page.

use actix_web::{HttpRequest, HttpResponse, http::header, post, web};
use chrono::{DateTime, Utc};
use schemas::{FieldViolation, ViolationCode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::PendingLogin;
use crate::domain::{
    EmailAddress, Error, NewUser, PersonName, UserId, UserValidationError, VerificationCode,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{code_format_error, collect, field_error, violations_error};
use crate::inbound::http::{Submission, see_other, unpack};

/// Body for `POST /api/v1/signup`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    #[serde(default)]
    #[schema(example = "Ada")]
    pub first_name: Option<String>,
    #[serde(default)]
    #[schema(example = "Lovelace")]
    pub last_name: Option<String>,
}

impl SignupRequest {
    fn into_new_user(self) -> Result<NewUser, Error> {
        let mut violations = Vec::new();
        let email = required(&mut violations, "email", self.email, EmailAddress::new);
        let first_name = required(&mut violations, "firstName", self.first_name, PersonName::new);
        let last_name = required(&mut violations, "lastName", self.last_name, PersonName::new);
        match (email, first_name, last_name) {
            (Some(email), Some(first_name), Some(last_name)) if violations.is_empty() => {
                Ok(NewUser {
                    email,
                    first_name,
                    last_name,
                })
            }
            _ => Err(violations_error(&violations)),
        }
    }
}

/// Run `parse` on a required field, recording `required` when absent.
pub(crate) fn required<T>(
    violations: &mut Vec<FieldViolation>,
    field: &str,
    raw: Option<String>,
    parse: impl FnOnce(String) -> Result<T, UserValidationError>,
) -> Option<T> {
    match raw {
        Some(raw) => collect(violations, field, parse(raw)),
        None => {
            violations.push(FieldViolation::new(field, ViolationCode::Required));
            None
        }
    }
}

/// Body for `POST /api/v1/login`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
}

/// Body for `POST /api/v1/verify`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct VerifyRequest {
    #[serde(default)]
    #[schema(example = "042917")]
    pub code: Option<String>,
}

/// A login waiting for its emailed code.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingLoginResponse {
    /// When the code stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl From<PendingLogin> for PendingLoginResponse {
    fn from(value: PendingLogin) -> Self {
        Self {
            expires_at: value.expires_at,
        }
    }
}

/// A verified session.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

fn pending_response(
    session: &SessionContext,
    pending: PendingLogin,
    via_form: bool,
) -> ApiResult<HttpResponse> {
    session.persist_pending(&pending.session_id)?;
    Ok(if via_form {
        see_other("/verify")
    } else {
        HttpResponse::Accepted().json(PendingLoginResponse::from(pending))
    })
}

/// Register an account and email a verification code.
#[utoipa::path(
    post,
    path = "/api/v1/signup",
    request_body = SignupRequest,
    responses(
        (status = 202, description = "Code sent", body = PendingLoginResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 303, description = "Form submission accepted; continue at /verify"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 503, description = "Storage or delivery unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signUp",
    security([])
)]
#[post("/signup")]
pub async fn sign_up(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: Submission<SignupRequest>,
) -> ApiResult<HttpResponse> {
    let (request, via_form) = unpack(payload);
    let details = request.into_new_user()?;
    let pending = state.sessions.sign_up(details).await?;
    pending_response(&session, pending, via_form)
}

/// Email a verification code to an existing account.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 202, description = "Code sent", body = PendingLoginResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 303, description = "Form submission accepted; continue at /verify"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "No account for this email", body = Error),
        (status = 503, description = "Storage or delivery unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: Submission<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let (request, via_form) = unpack(payload);
    let mut violations = Vec::new();
    let email = required(&mut violations, "email", request.email, EmailAddress::new)
        .ok_or_else(|| violations_error(&violations))?;
    let pending = state.sessions.request_login(&email).await?;
    pending_response(&session, pending, via_form)
}

/// Exchange the emailed code for an active session.
#[utoipa::path(
    post,
    path = "/api/v1/verify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Session active", body = SessionResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 303, description = "Form submission accepted; continue at /coach"),
        (status = 400, description = "Malformed code", body = Error),
        (status = 401, description = "Wrong or expired code, or no login pending", body = Error),
        (status = 403, description = "Too many attempts", body = Error),
        (status = 409, description = "Already verified", body = Error)
    ),
    tags = ["auth"],
    operation_id = "verify",
    security([])
)]
#[post("/verify")]
pub async fn verify(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: Submission<VerifyRequest>,
) -> ApiResult<HttpResponse> {
    let (request, via_form) = unpack(payload);
    let raw = request
        .code
        .ok_or_else(|| field_error("code", ViolationCode::Required, "code is required"))?;
    let code = VerificationCode::parse(&raw).map_err(code_format_error)?;
    let pending = session
        .pending_session_id()?
        .ok_or_else(|| Error::unauthorized("no login is awaiting verification"))?;

    let verified = state.sessions.verify(&pending, &code).await?;
    session.persist_session(verified.id())?;
    Ok(if via_form {
        see_other("/coach")
    } else {
        HttpResponse::Ok().json(SessionResponse {
            user_id: *verified.user_id(),
            expires_at: verified.expires_at(),
        })
    })
}

/// End the current session, pending or active.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses(
        (status = 204, description = "Logged out"),
        (status = 303, description = "Form submission accepted; continue at /login"),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let ids = [session.session_id()?, session.pending_session_id()?];
    for id in ids.into_iter().flatten() {
        state.sessions.log_out(&id).await?;
    }
    session.clear();

    let via_form = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));
    Ok(if via_form {
        see_other("/login")
    } else {
        HttpResponse::NoContent().finish()
    })
}

/// Resolve the verified session in the cookie to its user.
///
/// Stale identifiers are dropped from the cookie.
pub(crate) async fn require_user(
    state: &HttpState,
    session: &SessionContext,
) -> Result<UserId, Error> {
    let id = session
        .session_id()?
        .ok_or_else(|| Error::unauthorized("login required"))?;
    match state.sessions.resolve(&id).await? {
        Some(active) => Ok(*active.user_id()),
        None => {
            session.clear();
            Err(Error::unauthorized("session expired or revoked"))
        }
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;

//! Account endpoints.
//!
//! ```text
//! GET   /api/v1/users
//! GET   /api/v1/users/me
//! PATCH /api/v1/users/me {"firstName":"Ada","lastName":"Byron"}
//! POST  /api/v1/users/me/onboarding
//! ```

use actix_web::{get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, PersonName, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{require_user, required};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::violations_error;

/// Body for `PATCH /api/v1/users/me`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNamesRequest {
    #[serde(default)]
    #[schema(example = "Ada")]
    pub first_name: Option<String>,
    #[serde(default)]
    #[schema(example = "Byron")]
    pub last_name: Option<String>,
}

/// List the users visible to the caller, which is only their own account.
///
/// # Examples
/// ```no_run
/// use actix_web::App;
/// use retire_strong_backend::inbound::http::users::list_users;
///
/// let app = App::new().service(list_users);
/// ```
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "The caller's own account", body = [User]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<User>>> {
    let user_id = require_user(&state, &session).await?;
    let users = state.users.list_users(&user_id).await?;
    Ok(web::Json(users))
}

/// Profile of the signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Account no longer exists", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<User>> {
    let user_id = require_user(&state, &session).await?;
    Ok(web::Json(state.users.profile(&user_id).await?))
}

/// Rename the signed-in user.
#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    request_body = UpdateNamesRequest,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Invalid names", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateCurrentUser"
)]
#[patch("/users/me")]
pub async fn update_current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UpdateNamesRequest>,
) -> ApiResult<web::Json<User>> {
    let user_id = require_user(&state, &session).await?;
    let UpdateNamesRequest {
        first_name,
        last_name,
    } = payload.into_inner();

    let mut violations = Vec::new();
    let first_name = required(&mut violations, "firstName", first_name, PersonName::new);
    let last_name = required(&mut violations, "lastName", last_name, PersonName::new);
    let (Some(first_name), Some(last_name)) = (first_name, last_name) else {
        return Err(violations_error(&violations));
    };

    let user = state
        .users
        .update_names(&user_id, first_name, last_name)
        .await?;
    Ok(web::Json(user))
}

/// Mark onboarding complete. Repeating the call is harmless.
#[utoipa::path(
    post,
    path = "/api/v1/users/me/onboarding",
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "completeOnboarding"
)]
#[post("/users/me/onboarding")]
pub async fn complete_onboarding(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<User>> {
    let user_id = require_user(&state, &session).await?;
    Ok(web::Json(state.users.complete_onboarding(&user_id).await?))
}

//! HTTP inbound adapter exposing REST endpoints and the guarded pages.

pub mod auth;
pub mod checkins;
pub mod coach;
pub mod error;
pub mod health;
pub mod pages;
pub mod plans;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

use actix_web::error::{JsonPayloadError, QueryPayloadError, UrlencodedError};
use actix_web::http::header;
use actix_web::{Either, HttpRequest, HttpResponse, web};

use crate::domain::Error;

/// Body accepted either as JSON or as a URL-encoded page form.
pub type Submission<T> = Either<web::Json<T>, web::Form<T>>;

/// Split a [`Submission`] into its payload and whether it came from a form.
pub fn unpack<T>(submission: Submission<T>) -> (T, bool) {
    match submission {
        Either::Left(json) => (json.into_inner(), false),
        Either::Right(form) => (form.into_inner(), true),
    }
}

/// `303 See Other` pointing at `location`.
pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("malformed JSON body: {err}")).into()
}

fn form_error(err: UrlencodedError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("malformed form body: {err}")).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("malformed query string: {err}")).into()
}

/// Register the `/api/v1` scope.
///
/// Expects `web::Data<HttpState>` and the session middleware to be provided
/// by the enclosing app.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .app_data(web::JsonConfig::default().error_handler(json_error))
            .app_data(web::FormConfig::default().error_handler(form_error))
            .app_data(web::QueryConfig::default().error_handler(query_error))
            .service(auth::sign_up)
            .service(auth::login)
            .service(auth::verify)
            .service(auth::logout)
            .service(users::list_users)
            .service(users::current_user)
            .service(users::update_current_user)
            .service(users::complete_onboarding)
            .service(plans::list_plans)
            .service(plans::create_plan)
            .service(plans::active_plan)
            .service(plans::advance_plan)
            .service(checkins::list_checkins)
            .service(checkins::record_checkin)
            .service(checkins::streak)
            .service(coach::send_message),
    );
}

/// Register the HTML pages.
pub fn configure_pages(cfg: &mut web::ServiceConfig) {
    cfg.service(pages::login_page)
        .service(pages::signup_page)
        .service(pages::verify_page)
        .service(pages::coach_page);
}

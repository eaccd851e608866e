//! Server-rendered entry pages behind route guards.
//!
//! `/login`, `/signup` and `/verify` are for guests; members are sent on to
//! `/coach`. `/coach` is for members; guests are sent to `/login`. A failed
//! session lookup degrades to guest.

use std::sync::LazyLock;

use actix_web::http::header;
use actix_web::{HttpResponse, get, web};
use tracing::warn;

use crate::domain::coach::COACH_PROMPT_MAX;
use crate::domain::{GuardDecision, GuestOnly, MembersOnly, Presence, RouteGuard};
use crate::inbound::http::see_other;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

const LOGIN_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Log in | Retire Strong</title></head>
<body>
<main>
<h1>Log in</h1>
<form method="post" action="/api/v1/login">
<label for="email">Email</label>
<input id="email" name="email" type="email" autocomplete="email" required>
<button type="submit">Email me a code</button>
</form>
<p>New here? <a href="/signup">Create an account</a>.</p>
</main>
</body>
</html>
"#;

const SIGNUP_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Sign up | Retire Strong</title></head>
<body>
<main>
<h1>Create your account</h1>
<form method="post" action="/api/v1/signup">
<label for="firstName">First name</label>
<input id="firstName" name="firstName" autocomplete="given-name" required>
<label for="lastName">Last name</label>
<input id="lastName" name="lastName" autocomplete="family-name" required>
<label for="email">Email</label>
<input id="email" name="email" type="email" autocomplete="email" required>
<button type="submit">Email me a code</button>
</form>
<p>Already registered? <a href="/login">Log in</a>.</p>
</main>
</body>
</html>
"#;

const VERIFY_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Enter your code | Retire Strong</title></head>
<body>
<main>
<h1>Check your email</h1>
<form method="post" action="/api/v1/verify">
<label for="code">Six-digit code</label>
<input id="code" name="code" inputmode="numeric" pattern="[0-9]{6}" autocomplete="one-time-code" required>
<button type="submit">Continue</button>
</form>
<p>No email? <a href="/login">Send a new code</a>.</p>
</main>
</body>
</html>
"#;

const COACH_PAGE_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Your coach | Retire Strong</title></head>
<body>
<main>
<h1>Your coach</h1>
<form method="post" action="/api/v1/coach/messages">
<label for="message">Ask anything about your plan</label>
<textarea id="message" name="message" maxlength="{prompt_max}" required></textarea>
<button type="submit">Send</button>
</form>
<form method="post" action="/api/v1/logout">
<button type="submit">Log out</button>
</form>
</main>
</body>
</html>
"#;

/// Coach form with the textarea capped at the prompt limit the API enforces.
static COACH_PAGE: LazyLock<String> = LazyLock::new(|| {
    COACH_PAGE_TEMPLATE.replace("{prompt_max}", &COACH_PROMPT_MAX.to_string())
});

/// Whether the request carries a live verified session.
pub(crate) async fn presence(state: &HttpState, session: &SessionContext) -> Presence {
    let id = match session.session_id() {
        Ok(Some(id)) => id,
        Ok(None) => return Presence::Guest,
        Err(error) => {
            warn!(%error, "unreadable session cookie; treating visitor as guest");
            return Presence::Guest;
        }
    };
    match state.sessions.resolve(&id).await {
        Ok(Some(active)) => Presence::Member(*active.user_id()),
        Ok(None) => Presence::Guest,
        Err(error) => {
            warn!(%error, "session lookup failed; treating visitor as guest");
            Presence::Guest
        }
    }
}

async fn guarded(
    state: &HttpState,
    session: &SessionContext,
    guard: impl RouteGuard,
    page: &'static str,
) -> HttpResponse {
    match guard.evaluate(presence(state, session).await) {
        GuardDecision::Render => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .body(page),
        GuardDecision::Redirect(location) => see_other(location),
    }
}

#[get("/login")]
pub async fn login_page(state: web::Data<HttpState>, session: SessionContext) -> HttpResponse {
    guarded(&state, &session, GuestOnly, LOGIN_PAGE).await
}

#[get("/signup")]
pub async fn signup_page(state: web::Data<HttpState>, session: SessionContext) -> HttpResponse {
    guarded(&state, &session, GuestOnly, SIGNUP_PAGE).await
}

#[get("/verify")]
pub async fn verify_page(state: web::Data<HttpState>, session: SessionContext) -> HttpResponse {
    guarded(&state, &session, GuestOnly, VERIFY_PAGE).await
}

#[get("/coach")]
pub async fn coach_page(state: web::Data<HttpState>, session: SessionContext) -> HttpResponse {
    guarded(&state, &session, MembersOnly, COACH_PAGE.as_str()).await
}

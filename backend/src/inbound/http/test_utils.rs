//! Test helpers for inbound HTTP components.
//!
//! [`TestBackend`] wires the real services over in-memory adapters with a
//! controllable clock and a notifier that keeps the codes it was asked to
//! send, so handler tests can walk the full sign-up flow.

use std::sync::{Arc, Mutex};

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test as actix_test, web};
use async_trait::async_trait;
use serde_json::json;

use super::state::HttpState;
use super::{configure_api, configure_pages};
use crate::domain::ports::{VerificationNotifier, VerificationNotifierError};
use crate::domain::{
    CheckinServiceImpl, CoachServiceImpl, EmailAddress, PlanServiceImpl, SessionServiceImpl,
    UserServiceImpl, VerificationCode,
};
use crate::outbound::memory::{
    InMemoryCheckinRepository, InMemoryPlanRepository, InMemorySessionRepository,
    InMemoryUserRepository,
};
use crate::test_support::{MutableClock, fixture_now};

/// Session middleware with a fresh key and an insecure cookie named
/// `session`.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The `session` cookie set by a response, if any.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

/// Notifier remembering every code it delivered.
#[derive(Default)]
pub struct CapturingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl CapturingNotifier {
    /// Most recent code sent to `email`.
    pub fn last_code_for(&self, email: &str) -> Option<String> {
        let sent = match self.sent.lock() {
            Ok(sent) => sent,
            Err(poisoned) => poisoned.into_inner(),
        };
        sent.iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, code)| code.clone())
    }
}

#[async_trait]
impl VerificationNotifier for CapturingNotifier {
    async fn send_code(
        &self,
        email: &EmailAddress,
        code: &VerificationCode,
    ) -> Result<(), VerificationNotifierError> {
        let mut sent = self
            .sent
            .lock()
            .map_err(|_| VerificationNotifierError::delivery("notifier lock poisoned"))?;
        sent.push((email.to_string(), code.expose().to_owned()));
        Ok(())
    }
}

/// Real services over in-memory storage.
pub struct TestBackend {
    pub state: HttpState,
    pub clock: Arc<MutableClock>,
    pub notifier: Arc<CapturingNotifier>,
}

impl TestBackend {
    pub fn new() -> Self {
        let clock = Arc::new(MutableClock::new(fixture_now()));
        let notifier = Arc::new(CapturingNotifier::default());
        let users = Arc::new(InMemoryUserRepository::new());
        let plans = Arc::new(InMemoryPlanRepository::new());
        let sessions = Arc::new(InMemorySessionRepository::new());
        let checkins = Arc::new(InMemoryCheckinRepository::new());

        let state = HttpState {
            users: Arc::new(UserServiceImpl::new(users.clone(), clock.clone())),
            plans: Arc::new(PlanServiceImpl::new(plans.clone(), clock.clone())),
            sessions: Arc::new(SessionServiceImpl::new(
                users.clone(),
                sessions,
                notifier.clone(),
                clock.clone(),
            )),
            checkins: Arc::new(CheckinServiceImpl::new(checkins.clone(), clock.clone())),
            coach: Arc::new(CoachServiceImpl::new(users, plans, checkins, clock.clone())),
        };
        Self {
            state,
            clock,
            notifier,
        }
    }
}

/// App serving the API and pages over `state`.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .configure(configure_api)
        .configure(configure_pages)
}

/// Register `email` through the API and return the verified session cookie.
pub async fn signed_in<S>(app: &S, backend: &TestBackend, email: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let signup = actix_test::TestRequest::post()
        .uri("/api/v1/signup")
        .set_json(json!({ "email": email, "firstName": "Ada", "lastName": "Lovelace" }))
        .to_request();
    let response = actix_test::call_service(app, signup).await;
    assert!(response.status().is_success(), "signup failed: {}", response.status());
    let pending = session_cookie(&response).expect("pending session cookie");

    let code = backend.notifier.last_code_for(email).expect("code delivered");
    let verify = actix_test::TestRequest::post()
        .uri("/api/v1/verify")
        .cookie(pending)
        .set_json(json!({ "code": code }))
        .to_request();
    let response = actix_test::call_service(app, verify).await;
    assert!(response.status().is_success(), "verify failed: {}", response.status());
    session_cookie(&response).expect("verified session cookie")
}

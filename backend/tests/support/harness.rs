//! Server harness and shared world for the behaviour suites.
//!
//! The harness owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix uses `spawn_local` internally. The server runs the real services over
//! in-memory storage with a fixed clock; a capturing notifier stands in for
//! email delivery so steps can read the codes a member would receive.

use std::cell::RefCell;
use std::net::TcpListener;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use actix_session::SessionMiddleware;
use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Key, SameSite, time::Duration as CookieDuration};
use actix_web::dev::ServerHandle;
use actix_web::http::{Method, header};
use actix_web::{App, HttpServer, web};
use async_trait::async_trait;
use awc::Client;
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;
use retire_strong_backend::Trace;
use retire_strong_backend::domain::ports::{VerificationNotifier, VerificationNotifierError};
use retire_strong_backend::domain::{
    CheckinServiceImpl, CoachServiceImpl, EmailAddress, PlanServiceImpl, SessionServiceImpl,
    TRACE_ID_HEADER, UserServiceImpl, VerificationCode,
};
use retire_strong_backend::inbound::http::state::HttpState;
use retire_strong_backend::inbound::http::{configure_api, configure_pages};
use retire_strong_backend::outbound::memory::{
    InMemoryCheckinRepository, InMemoryPlanRepository, InMemorySessionRepository,
    InMemoryUserRepository,
};
use serde_json::Value;
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

/// Clock pinned to a single instant.
pub(crate) struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Notifier keeping every code it was asked to deliver.
#[derive(Default)]
pub(crate) struct CapturingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl CapturingNotifier {
    pub(crate) fn last_code_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .expect("notifier lock")
            .iter()
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
        self.sent
            .lock()
            .expect("notifier lock")
            .push((email.to_string(), code.expose().to_owned()));
        Ok(())
    }
}

pub(crate) struct JourneyWorld {
    pub(crate) runtime: Runtime,
    pub(crate) local: LocalSet,
    pub(crate) base_url: String,
    pub(crate) server: ServerHandle,
    pub(crate) notifier: Arc<CapturingNotifier>,
    pub(crate) today: NaiveDate,
    pub(crate) email: Option<String>,
    pub(crate) plan_id: Option<String>,
    pub(crate) session_cookie: Option<String>,
    pub(crate) last_status: Option<u16>,
    pub(crate) last_body: Option<Value>,
    pub(crate) last_text: Option<String>,
    pub(crate) last_location: Option<String>,
    pub(crate) last_trace_id: Option<String>,
}

pub(crate) type SharedWorld = Rc<RefCell<JourneyWorld>>;

pub(crate) struct WorldFixture {
    world: SharedWorld,
}

impl WorldFixture {
    pub(crate) fn world(&self) -> SharedWorld {
        self.world.clone()
    }
}

impl Drop for WorldFixture {
    fn drop(&mut self) {
        shutdown(self.world.clone());
    }
}

pub(crate) fn shutdown(world: SharedWorld) {
    // `LocalSet` must be driven on the thread that owns it, so we hold the
    // world while calling `block_on`. The future must not borrow the world.
    let ctx = world.borrow();
    let server = ctx.server.clone();
    ctx.local.block_on(&ctx.runtime, async move {
        server.stop(true).await;
    });
}

pub(crate) fn with_world_async<R, F>(world: &SharedWorld, operation: impl FnOnce(String) -> F) -> R
where
    F: std::future::Future<Output = R>,
{
    let ctx = world.borrow();
    let base_url = ctx.base_url.clone();
    ctx.local.block_on(&ctx.runtime, operation(base_url))
}

/// How a request body is encoded.
pub(crate) enum Body {
    Empty,
    Json(Value),
    Form(Vec<(&'static str, String)>),
}

/// Send a request with the stored session cookie and record the outcome.
///
/// Redirects are not followed so steps can assert on `Location`. A
/// `Set-Cookie` for the session replaces the stored cookie; a removal
/// cookie clears it.
pub(crate) fn send(world: &SharedWorld, method: Method, path: &str, body: Body) {
    let cookie = world.borrow().session_cookie.clone();
    let path = path.to_owned();
    let (status, headers, bytes) = with_world_async(world, |base_url| async move {
        let client = Client::builder().disable_redirects().finish();
        let mut request = client.request(method, format!("{base_url}{path}"));
        if let Some(cookie) = cookie {
            request = request.insert_header((header::COOKIE, cookie));
        }
        let mut response = match body {
            Body::Empty => request.send().await,
            Body::Json(payload) => request.send_json(&payload).await,
            Body::Form(fields) => request.send_form(&fields).await,
        }
        .expect("request should complete");
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let bytes = response.body().await.expect("response body");
        (status, headers, bytes)
    });

    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };
    let text = String::from_utf8_lossy(&bytes).into_owned();

    let mut ctx = world.borrow_mut();
    ctx.last_status = Some(status);
    ctx.last_location = header_value(header::LOCATION);
    ctx.last_trace_id = header_value(header::HeaderName::from_static(TRACE_ID_HEADER));
    ctx.last_body = serde_json::from_slice(&bytes).ok();
    ctx.last_text = Some(text);

    let set_cookie = headers
        .get_all(header::SET_COOKIE)
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .find(|pair| pair.starts_with("session="))
        .map(str::to_owned);
    if let Some(pair) = set_cookie {
        ctx.session_cookie = (pair != "session=").then_some(pair);
    }
}

fn test_session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(false)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .session_lifecycle(PersistentSession::default().session_ttl(CookieDuration::days(30)))
        .build()
}

fn build_state(notifier: Arc<CapturingNotifier>, clock: Arc<dyn Clock>) -> HttpState {
    let users = Arc::new(InMemoryUserRepository::new());
    let plans = Arc::new(InMemoryPlanRepository::new());
    let sessions = Arc::new(InMemorySessionRepository::new());
    let checkins = Arc::new(InMemoryCheckinRepository::new());

    HttpState {
        users: Arc::new(UserServiceImpl::new(users.clone(), clock.clone())),
        plans: Arc::new(PlanServiceImpl::new(plans.clone(), clock.clone())),
        sessions: Arc::new(SessionServiceImpl::new(
            users.clone(),
            sessions,
            notifier,
            clock.clone(),
        )),
        checkins: Arc::new(CheckinServiceImpl::new(checkins.clone(), clock.clone())),
        coach: Arc::new(CoachServiceImpl::new(users, plans, checkins, clock)),
    }
}

async fn spawn_server(http_state: HttpState) -> Result<(String, ServerHandle), String> {
    let key = Key::generate();
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;
    let http_data = web::Data::new(http_state);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(http_data.clone())
            .wrap(test_session_middleware(key.clone()))
            .wrap(Trace)
            .configure(configure_api)
            .configure(configure_pages)
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .map_err(|err| err.to_string())?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);

    Ok((format!("http://{addr}"), handle))
}

fn create_runtime_and_local() -> (Runtime, LocalSet) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    (runtime, LocalSet::new())
}

pub(crate) fn world() -> WorldFixture {
    let (runtime, local) = create_runtime_and_local();
    let now = Utc
        .with_ymd_and_hms(2024, 5, 6, 9, 30, 0)
        .single()
        .expect("fixture timestamp");
    let notifier = Arc::new(CapturingNotifier::default());
    let state = build_state(notifier.clone(), Arc::new(FixedClock(now)));

    let (base_url, server) = local
        .block_on(&runtime, async { spawn_server(state).await })
        .expect("server should start");

    let world = Rc::new(RefCell::new(JourneyWorld {
        runtime,
        local,
        base_url,
        server,
        notifier,
        today: now.date_naive(),
        email: None,
        plan_id: None,
        session_cookie: None,
        last_status: None,
        last_body: None,
        last_text: None,
        last_location: None,
        last_trace_id: None,
    }));

    WorldFixture { world }
}

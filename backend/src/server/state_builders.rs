//! Wiring of domain services over the configured storage backend.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::info;

use retire_strong_backend::domain::ports::{
    CheckinRepository, PlanRepository, SessionRepository, UserRepository, VerificationNotifier,
};
use retire_strong_backend::domain::{
    CheckinServiceImpl, CoachServiceImpl, PlanServiceImpl, SessionServiceImpl, UserServiceImpl,
};
use retire_strong_backend::inbound::http::state::HttpState;
use retire_strong_backend::outbound::memory::{
    InMemoryCheckinRepository, InMemoryPlanRepository, InMemorySessionRepository,
    InMemoryUserRepository,
};
use retire_strong_backend::outbound::notify::TracingVerificationNotifier;
use retire_strong_backend::outbound::persistence::{
    DbPool, DieselCheckinRepository, DieselPlanRepository, DieselSessionRepository,
    DieselUserRepository,
};

/// One repository per driven port.
struct Repositories {
    users: Arc<dyn UserRepository>,
    plans: Arc<dyn PlanRepository>,
    sessions: Arc<dyn SessionRepository>,
    checkins: Arc<dyn CheckinRepository>,
}

impl Repositories {
    fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            plans: Arc::new(InMemoryPlanRepository::new()),
            sessions: Arc::new(InMemorySessionRepository::new()),
            checkins: Arc::new(InMemoryCheckinRepository::new()),
        }
    }

    fn postgres(pool: &DbPool) -> Self {
        Self {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            plans: Arc::new(DieselPlanRepository::new(pool.clone())),
            sessions: Arc::new(DieselSessionRepository::new(pool.clone())),
            checkins: Arc::new(DieselCheckinRepository::new(pool.clone())),
        }
    }
}

fn wire(
    repositories: Repositories,
    notifier: Arc<dyn VerificationNotifier>,
    clock: Arc<dyn Clock>,
) -> HttpState {
    let Repositories {
        users,
        plans,
        sessions,
        checkins,
    } = repositories;
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

/// Build the handler state, backed by PostgreSQL when a pool is given and
/// by process memory otherwise.
pub(crate) fn build_http_state(pool: Option<&DbPool>) -> HttpState {
    let repositories = match pool {
        Some(pool) => {
            info!(storage = "postgres", "wiring repositories");
            Repositories::postgres(pool)
        }
        None => {
            info!(storage = "memory", "wiring repositories");
            Repositories::in_memory()
        }
    };
    wire(
        repositories,
        Arc::new(TracingVerificationNotifier),
        Arc::new(DefaultClock),
    )
}

//! PostgreSQL persistence adapters.
//!
//! Diesel repositories implementing the driven ports over a shared
//! [`DbPool`]. Unique constraints named in the migrations are translated to
//! the ports' duplicate variants; everything else becomes a connection or
//! query error.

mod diesel_checkin_repository;
mod diesel_error_mapping;
mod diesel_plan_repository;
mod diesel_session_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_checkin_repository::DieselCheckinRepository;
pub use diesel_plan_repository::DieselPlanRepository;
pub use diesel_session_repository::DieselSessionRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};

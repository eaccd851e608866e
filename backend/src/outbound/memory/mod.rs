//! In-memory repositories.
//!
//! These adapters back the default server configuration and the behaviour
//! tests. Each store guards a map with a `std::sync::RwLock`; a poisoned lock
//! surfaces as a `Query` error rather than a panic. Storage-level uniqueness
//! rules (email per user, one check-in per day, one active plan) mirror the
//! PostgreSQL constraints.

mod checkin_repository;
mod plan_repository;
mod session_repository;
mod user_repository;

pub use checkin_repository::InMemoryCheckinRepository;
pub use plan_repository::InMemoryPlanRepository;
pub use session_repository::InMemorySessionRepository;
pub use user_repository::InMemoryUserRepository;

//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`VerificationNotifier`]) are implemented by
//! outbound adapters. Driving ports (`*Service`) are what inbound adapters
//! call; the domain provides their implementations.

mod macros;
pub(crate) use macros::define_port_error;

mod checkin_repository;
mod checkin_service;
mod coach_service;
mod plan_repository;
mod plan_service;
mod session_repository;
mod session_service;
mod user_repository;
mod user_service;
mod verification_notifier;

#[cfg(test)]
pub use checkin_repository::MockCheckinRepository;
pub use checkin_repository::{CheckinRepository, CheckinRepositoryError};
#[cfg(test)]
pub use checkin_service::MockCheckinService;
pub use checkin_service::CheckinService;
#[cfg(test)]
pub use coach_service::MockCoachService;
pub use coach_service::CoachService;
#[cfg(test)]
pub use plan_repository::MockPlanRepository;
pub use plan_repository::{PlanRepository, PlanRepositoryError};
#[cfg(test)]
pub use plan_service::MockPlanService;
pub use plan_service::PlanService;
#[cfg(test)]
pub use session_repository::MockSessionRepository;
pub use session_repository::{SessionRepository, SessionRepositoryError};
#[cfg(test)]
pub use session_service::MockSessionService;
pub use session_service::{PendingLogin, SessionService};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
#[cfg(test)]
pub use user_service::MockUserService;
pub use user_service::UserService;
#[cfg(test)]
pub use verification_notifier::MockVerificationNotifier;
pub use verification_notifier::{VerificationNotifier, VerificationNotifierError};

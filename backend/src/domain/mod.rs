//! Domain primitives, aggregates, and services.
//!
//! Purpose: define strongly typed entities for the coaching app and the
//! services that orchestrate them through ports. Types validate their
//! invariants on construction; adapters translate to and from transport or
//! storage shapes at the edges.
//!
//! Public surface:
//! - Error: transport-agnostic failure payload.
//! - User, Plan, Checkin, Session: persisted entities.
//! - CoachPrompt, CoachReply: coach conversation values.
//! - Presence, GuardDecision, GuestOnly, MembersOnly: page guards.
//! - `*ServiceImpl`: use-case services implementing the driving ports.

pub mod checkin;
mod checkin_service;
pub mod coach;
mod coach_service;
pub mod error;
pub mod guard;
pub mod plan;
mod plan_service;
pub mod ports;
mod service_errors;
pub mod session;
mod session_service;
mod trace_id;
pub mod user;
mod user_service;

pub use self::checkin::{
    Checkin, CheckinAnswers, CheckinId, CheckinValidationError, Rating, current_streak,
};
pub use self::checkin_service::CheckinServiceImpl;
pub use self::coach::{CoachContext, CoachPrompt, CoachPromptValidationError, CoachReply};
pub use self::coach_service::CoachServiceImpl;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::guard::{GuardDecision, GuestOnly, MembersOnly, Presence, RouteGuard};
pub use self::plan::{
    Milestone, Plan, PlanDraft, PlanId, PlanParts, PlanProgressError, PlanStatus,
    PlanValidationError,
};
pub use self::plan_service::PlanServiceImpl;
pub use self::session::{
    MAX_VERIFICATION_ATTEMPTS, Session, SessionId, SessionState, VerificationCode,
    VerificationError,
};
pub use self::session_service::SessionServiceImpl;
pub use self::trace_id::TraceId;
pub use self::user::{EmailAddress, NewUser, PersonName, User, UserId, UserValidationError};
pub use self::user_service::UserServiceImpl;

/// Header carrying the request trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

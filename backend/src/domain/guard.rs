//! Page guards deciding whether a page renders or redirects.
//!
//! Guards only shape navigation. API endpoints authenticate independently.

use super::UserId;

/// Whether the visitor holds an active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// No usable session.
    Guest,
    /// Authenticated member.
    Member(UserId),
}

/// Outcome of evaluating a guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the requested page.
    Render,
    /// Send the visitor elsewhere.
    Redirect(&'static str),
}

/// A rule evaluated before a page renders.
pub trait RouteGuard {
    /// Decide what to do for `presence`.
    fn evaluate(&self, presence: Presence) -> GuardDecision;
}

/// Entry pages: members are sent on to the coach.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuestOnly;

impl RouteGuard for GuestOnly {
    fn evaluate(&self, presence: Presence) -> GuardDecision {
        match presence {
            Presence::Guest => GuardDecision::Render,
            Presence::Member(_) => GuardDecision::Redirect("/coach"),
        }
    }
}

/// Member pages: guests are sent to log in.
#[derive(Debug, Clone, Copy, Default)]
pub struct MembersOnly;

impl RouteGuard for MembersOnly {
    fn evaluate(&self, presence: Presence) -> GuardDecision {
        match presence {
            Presence::Guest => GuardDecision::Redirect("/login"),
            Presence::Member(_) => GuardDecision::Render,
        }
    }
}

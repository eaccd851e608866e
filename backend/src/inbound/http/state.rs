//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see the driving ports,
//! so they stay testable without storage.

use std::sync::Arc;

use crate::domain::ports::{
    CheckinService, CoachService, PlanService, SessionService, UserService,
};

/// Driving ports used by the HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UserService>,
    pub plans: Arc<dyn PlanService>,
    pub sessions: Arc<dyn SessionService>,
    pub checkins: Arc<dyn CheckinService>,
    pub coach: Arc<dyn CoachService>,
}

//! Background removal of expired sessions.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use retire_strong_backend::domain::ports::SessionService;

/// How often expired sessions are purged.
pub(crate) const SWEEP_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Purge expired sessions every `period` for the life of the runtime.
///
/// The first sweep runs immediately. Failures are logged and retried on the
/// next tick.
pub(crate) fn spawn_session_sweeper(
    sessions: Arc<dyn SessionService>,
    period: Duration,
) -> tokio::task::JoinHandle<()> {
    actix_web::rt::spawn(async move {
        let mut ticks = tokio::time::interval(period);
        ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticks.tick().await;
            if let Err(err) = sessions.purge_expired().await {
                warn!(error = %err, "expired session purge failed");
            }
        }
    })
}

//! Notifier that writes codes to the log.
//!
//! Stands in for an email transport in development and tests. The code is
//! emitted at `info` under the `verification` target so operators can filter
//! it out of shared log sinks.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{VerificationNotifier, VerificationNotifierError};
use crate::domain::{EmailAddress, VerificationCode};

/// Logs each issued code instead of sending it.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingVerificationNotifier;

#[async_trait]
impl VerificationNotifier for TracingVerificationNotifier {
    async fn send_code(
        &self,
        email: &EmailAddress,
        code: &VerificationCode,
    ) -> Result<(), VerificationNotifierError> {
        info!(
            target: "verification",
            email = %email,
            code = code.expose(),
            "verification code issued"
        );
        Ok(())
    }
}

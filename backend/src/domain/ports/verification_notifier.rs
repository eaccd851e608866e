//! Driven port delivering verification codes to users.

use async_trait::async_trait;

use crate::domain::{EmailAddress, VerificationCode};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notifier adapters.
    pub enum VerificationNotifierError {
        /// The code could not be handed to the delivery channel.
        Delivery { message: String } => "verification code delivery failed: {message}",
    }
}

/// Port for sending a freshly issued code to its recipient.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VerificationNotifier: Send + Sync {
    /// Deliver `code` to `email`.
    async fn send_code(
        &self,
        email: &EmailAddress,
        code: &VerificationCode,
    ) -> Result<(), VerificationNotifierError>;
}

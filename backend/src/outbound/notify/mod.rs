//! Verification code delivery adapters.

mod tracing_notifier;

pub use tracing_notifier::TracingVerificationNotifier;

//! Outbound adapters implementing the driven ports.
//!
//! - **memory**: process-local repositories, the default backend.
//! - **persistence**: PostgreSQL repositories built on Diesel.
//! - **notify**: verification code delivery.
//!
//! Adapters translate between domain types and storage shapes only; business
//! rules stay in the domain services.

pub mod memory;
pub mod notify;
pub mod persistence;

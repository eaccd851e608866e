//! Inbound adapters translating HTTP requests into domain service calls.
//!
//! Framework details stay here; handlers only map requests and responses.

pub mod http;

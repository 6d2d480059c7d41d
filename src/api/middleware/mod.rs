//! HTTP middleware and extractors for request processing and protection.
//!
//! Provides caller credential extraction, rate limiting, and observability.

pub mod credential;
pub mod rate_limit;
pub mod tracing;

pub use credential::CallerCredential;

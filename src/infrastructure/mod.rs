//! Infrastructure layer for external integrations.
//!
//! Implements the traits defined by the domain layer.
//!
//! # Modules
//!
//! - [`persistence`] - Share link stores (in-memory and PostgreSQL)
//! - [`upstream`] - HTTP client for the campaign results source

pub mod persistence;
pub mod upstream;

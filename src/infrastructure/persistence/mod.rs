//! Share link store implementations.
//!
//! # Repositories
//!
//! - [`InMemoryShareLinkRepository`] - Process-local map, development default
//! - [`PgShareLinkRepository`] - PostgreSQL with compare-and-swap deactivation

pub mod memory_share_link_repository;
pub mod pg_share_link_repository;

pub use memory_share_link_repository::InMemoryShareLinkRepository;
pub use pg_share_link_repository::PgShareLinkRepository;

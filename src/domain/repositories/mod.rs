//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`ShareLinkRepository`] - Share link lifecycle storage

pub mod share_link_repository;

pub use share_link_repository::ShareLinkRepository;

#[cfg(test)]
pub use share_link_repository::MockShareLinkRepository;

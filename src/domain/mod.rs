//! Domain layer containing business entities and logic.
//!
//! Independent of HTTP, storage and the upstream transport.
//!
//! # Architecture
//!
//! - [`entities`] - Share links and raw post records
//! - [`repositories`] - Share link storage contract
//! - [`sources`] - Upstream results source contract and credentials
//! - [`analytics`] - Pure aggregation of post records into a snapshot
//!
//! # Report Flow
//!
//! 1. A share link is validated through [`repositories::ShareLinkRepository`]
//! 2. Raw records are fetched through [`sources::ResultsSource`]
//! 3. [`analytics::compute_with`] reduces them into an [`analytics::AnalyticsSnapshot`]

pub mod analytics;
pub mod entities;
pub mod repositories;
pub mod sources;

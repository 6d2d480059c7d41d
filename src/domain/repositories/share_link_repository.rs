//! Repository trait for share link storage.

use crate::domain::entities::{Deactivation, ShareLink};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Keyed lifecycle store for share links.
///
/// The only mutation after creation is [`ShareLinkRepository::deactivate`],
/// which must be an atomic compare-and-swap on `is_active` for a single key.
/// Operations on different keys must not block each other.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::InMemoryShareLinkRepository`] - single-instance default
/// - [`crate::infrastructure::persistence::PgShareLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShareLinkRepository: Send + Sync {
    /// Stores a new share link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the identifier is already taken.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn create(&self, link: ShareLink) -> Result<ShareLink, AppError>;

    /// Finds a share link by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find(&self, id: &str) -> Result<Option<ShareLink>, AppError>;

    /// Atomically switches an active link off.
    ///
    /// If the link is still active it becomes inactive (and `revoked_at = at`
    /// for [`Deactivation::Revoked`]). If it is already inactive nothing
    /// changes. Either way the stored record after the operation is returned,
    /// so concurrent callers all observe the single winning transition.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(link))` with the post-operation state
    /// - `Ok(None)` if the identifier was never issued
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn deactivate(
        &self,
        id: &str,
        reason: Deactivation,
        at: DateTime<Utc>,
    ) -> Result<Option<ShareLink>, AppError>;

    /// Lists every link issued for a campaign, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn list_by_campaign(&self, campaign_id: &str) -> Result<Vec<ShareLink>, AppError>;

    /// Checks that the backing store is reachable.
    async fn health_check(&self) -> bool;
}

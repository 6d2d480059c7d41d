//! Share link registry: minting, validation and revocation.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use crate::domain::entities::{Deactivation, LinkStatus, ShareLink};
use crate::domain::repositories::ShareLinkRepository;
use crate::error::AppError;
use crate::utils::share_id::generate_share_id;

/// Outcome of validating a share link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkValidation {
    Valid(ShareLink),
    NotFound,
    Revoked(ShareLink),
    Expired(ShareLink),
}

impl LinkValidation {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkValidation::Valid(_) => "valid",
            LinkValidation::NotFound => "not_found",
            LinkValidation::Revoked(_) => "revoked",
            LinkValidation::Expired(_) => "expired",
        }
    }
}

/// Service issuing and gating public report identifiers.
///
/// All state lives in the repository; the service only decides which
/// transition to request. Expiry is applied lazily: the first validation
/// after `expires_at` switches the link off.
pub struct ShareLinkService<R: ShareLinkRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: ShareLinkRepository + ?Sized> ShareLinkService<R> {
    /// Creates a new share link service.
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Issues a new active link for a campaign, valid for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `ttl` is not positive or the
    /// expiry would fall outside the representable date range.
    /// Returns [`AppError::Internal`] if no unused identifier could be found
    /// or on storage errors.
    pub async fn create(
        &self,
        campaign_id: &str,
        campaign_name: &str,
        ttl: Duration,
    ) -> Result<ShareLink, AppError> {
        const MAX_ATTEMPTS: usize = 10;

        if ttl <= Duration::zero() {
            return Err(AppError::bad_request(
                "Share link TTL must be positive",
                json!({ "ttl_seconds": ttl.num_seconds() }),
            ));
        }

        let now = Utc::now();
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            AppError::bad_request(
                "Share link TTL is out of range",
                json!({ "ttl_seconds": ttl.num_seconds() }),
            )
        })?;

        for _ in 0..MAX_ATTEMPTS {
            let id = generate_share_id()?;

            if self.repository.find(&id).await?.is_some() {
                continue;
            }

            let link = ShareLink::new(
                id,
                campaign_id.to_string(),
                campaign_name.to_string(),
                now,
                expires_at,
            );

            match self.repository.create(link).await {
                Ok(link) => {
                    tracing::info!(
                        share_id = %link.id,
                        campaign_id = %link.campaign_id,
                        expires_at = %link.expires_at,
                        "Share link created"
                    );
                    metrics::counter!("share_links_created_total").increment(1);
                    return Ok(link);
                }
                // Lost a race for the same id; draw another one.
                Err(AppError::Conflict { .. }) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal(
            "Failed to generate unique share id",
            json!({ "reason": "Too many collisions" }),
        ))
    }

    /// Looks up a link without applying lazy expiry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the identifier was never issued.
    pub async fn resolve(&self, id: &str) -> Result<ShareLink, AppError> {
        self.repository
            .find(id)
            .await?
            .ok_or_else(|| AppError::not_found("Share link not found", json!({ "share_id": id })))
    }

    /// Validates a link at the current time.
    ///
    /// See [`Self::validate_at`].
    pub async fn validate(&self, id: &str) -> Result<LinkValidation, AppError> {
        self.validate_at(id, Utc::now()).await
    }

    /// Validates a link as of `now`.
    ///
    /// An active link past its expiry is switched off here (lazy expiry) and
    /// reported as expired. If a concurrent revoke wins that switch, the
    /// revoke's classification is reported instead.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors only; unknown,
    /// revoked and expired links are reported through [`LinkValidation`].
    pub async fn validate_at(
        &self,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<LinkValidation, AppError> {
        let Some(link) = self.repository.find(id).await? else {
            return Ok(LinkValidation::NotFound);
        };

        match link.status_at(now) {
            LinkStatus::Active => Ok(LinkValidation::Valid(link)),
            LinkStatus::Revoked => Ok(LinkValidation::Revoked(link)),
            LinkStatus::Expired if !link.is_active => Ok(LinkValidation::Expired(link)),
            LinkStatus::Expired => {
                let Some(current) = self
                    .repository
                    .deactivate(id, Deactivation::Expired, now)
                    .await?
                else {
                    return Ok(LinkValidation::NotFound);
                };

                tracing::info!(share_id = %id, "Share link expired");

                Ok(if current.is_revoked() {
                    LinkValidation::Revoked(current)
                } else {
                    LinkValidation::Expired(current)
                })
            }
        }
    }

    /// Revokes a link. Idempotent: revoking an inactive link succeeds and
    /// leaves its earlier classification untouched.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the identifier was never issued.
    pub async fn revoke(&self, id: &str) -> Result<ShareLink, AppError> {
        let link = self
            .repository
            .deactivate(id, Deactivation::Revoked, Utc::now())
            .await?
            .ok_or_else(|| AppError::not_found("Share link not found", json!({ "share_id": id })))?;

        tracing::info!(share_id = %id, status = link.status_at(Utc::now()).as_str(), "Share link revoked");
        metrics::counter!("share_links_revoked_total").increment(1);

        Ok(link)
    }

    /// Lists every link issued for a campaign.
    pub async fn list_for_campaign(&self, campaign_id: &str) -> Result<Vec<ShareLink>, AppError> {
        self.repository.list_by_campaign(campaign_id).await
    }

    /// Reports whether the backing store is reachable.
    pub async fn store_healthy(&self) -> bool {
        self.repository.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockShareLinkRepository;

    fn test_link(id: &str, expires_in: Duration) -> ShareLink {
        let now = Utc::now();
        ShareLink::new(
            id.to_string(),
            "campaign-1".to_string(),
            "Launch".to_string(),
            now,
            now + expires_in,
        )
    }

    #[tokio::test]
    async fn test_create_success() {
        let mut repo = MockShareLinkRepository::new();

        repo.expect_find().times(1).returning(|_| Ok(None));
        repo.expect_create()
            .withf(|link| link.campaign_id == "campaign-1" && link.is_active)
            .times(1)
            .returning(|link| Ok(link));

        let service = ShareLinkService::new(Arc::new(repo));
        let link = service
            .create("campaign-1", "Launch", Duration::hours(24))
            .await
            .unwrap();

        assert_eq!(link.campaign_name, "Launch");
        assert_eq!(link.id.len(), 16);
        assert_eq!(link.expires_at - link.created_at, Duration::hours(24));
    }

    #[tokio::test]
    async fn test_create_retries_on_collision() {
        let mut repo = MockShareLinkRepository::new();

        let existing = test_link("takentaken123456", Duration::hours(1));
        let mut calls = 0;
        repo.expect_find().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(Some(existing.clone()))
            } else {
                Ok(None)
            }
        });
        repo.expect_create().times(1).returning(|link| Ok(link));

        let service = ShareLinkService::new(Arc::new(repo));
        assert!(service.create("c", "n", Duration::hours(1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_retries_on_conflict_race() {
        let mut repo = MockShareLinkRepository::new();

        repo.expect_find().times(2).returning(|_| Ok(None));
        let mut calls = 0;
        repo.expect_create().times(2).returning(move |link| {
            calls += 1;
            if calls == 1 {
                Err(AppError::conflict("taken", json!({})))
            } else {
                Ok(link)
            }
        });

        let service = ShareLinkService::new(Arc::new(repo));
        assert!(service.create("c", "n", Duration::hours(1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_rejects_non_positive_ttl() {
        let repo = MockShareLinkRepository::new();
        let service = ShareLinkService::new(Arc::new(repo));

        let err = service.create("c", "n", Duration::zero()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_rejects_out_of_range_ttl() {
        let repo = MockShareLinkRepository::new();
        let service = ShareLinkService::new(Arc::new(repo));

        let err = service.create("c", "n", Duration::MAX).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));

        let err = service
            .create("c", "n", Duration::hours(i64::from(4_000_000_000u32)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let mut repo = MockShareLinkRepository::new();
        repo.expect_find().returning(|_| Ok(None));

        let service = ShareLinkService::new(Arc::new(repo));
        let err = service.resolve("missing123").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_validate_active() {
        let mut repo = MockShareLinkRepository::new();
        let link = test_link("activeactive1234", Duration::hours(1));
        repo.expect_find().returning(move |_| Ok(Some(link.clone())));
        repo.expect_deactivate().times(0);

        let service = ShareLinkService::new(Arc::new(repo));
        let result = service.validate("activeactive1234").await.unwrap();
        assert!(matches!(result, LinkValidation::Valid(_)));
    }

    #[tokio::test]
    async fn test_validate_unknown() {
        let mut repo = MockShareLinkRepository::new();
        repo.expect_find().returning(|_| Ok(None));

        let service = ShareLinkService::new(Arc::new(repo));
        assert_eq!(
            service.validate("unknown12345").await.unwrap(),
            LinkValidation::NotFound
        );
    }

    #[tokio::test]
    async fn test_validate_applies_lazy_expiry() {
        let mut repo = MockShareLinkRepository::new();
        let link = test_link("expiredexpired12", Duration::seconds(-10));
        let stored = link.clone();
        repo.expect_find().returning(move |_| Ok(Some(stored.clone())));
        repo.expect_deactivate()
            .withf(|id, reason, _| id == "expiredexpired12" && *reason == Deactivation::Expired)
            .times(1)
            .returning(move |_, reason, at| {
                let mut link = link.clone();
                link.deactivate(reason, at);
                Ok(Some(link))
            });

        let service = ShareLinkService::new(Arc::new(repo));
        let result = service.validate("expiredexpired12").await.unwrap();

        match result {
            LinkValidation::Expired(link) => assert!(!link.is_active),
            other => panic!("expected expired, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_validate_reports_revoke_that_won_the_race() {
        let mut repo = MockShareLinkRepository::new();
        let link = test_link("racyracyracy1234", Duration::seconds(-10));
        let stored = link.clone();
        repo.expect_find().returning(move |_| Ok(Some(stored.clone())));
        repo.expect_deactivate().times(1).returning(move |_, _, at| {
            let mut link = link.clone();
            link.deactivate(Deactivation::Revoked, at);
            Ok(Some(link))
        });

        let service = ShareLinkService::new(Arc::new(repo));
        let result = service.validate("racyracyracy1234").await.unwrap();
        assert!(matches!(result, LinkValidation::Revoked(_)));
    }

    #[tokio::test]
    async fn test_validate_already_expired_does_not_write() {
        let mut repo = MockShareLinkRepository::new();
        let mut link = test_link("donedonedone1234", Duration::seconds(-10));
        link.deactivate(Deactivation::Expired, Utc::now());
        repo.expect_find().returning(move |_| Ok(Some(link.clone())));
        repo.expect_deactivate().times(0);

        let service = ShareLinkService::new(Arc::new(repo));
        let result = service.validate("donedonedone1234").await.unwrap();
        assert!(matches!(result, LinkValidation::Expired(_)));
    }

    #[tokio::test]
    async fn test_revoke_not_found() {
        let mut repo = MockShareLinkRepository::new();
        repo.expect_deactivate().returning(|_, _, _| Ok(None));

        let service = ShareLinkService::new(Arc::new(repo));
        let err = service.revoke("neverissued1").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_revoke_requests_revoked_transition() {
        let mut repo = MockShareLinkRepository::new();
        let link = test_link("revokerevoke1234", Duration::hours(1));
        repo.expect_deactivate()
            .withf(|_, reason, _| *reason == Deactivation::Revoked)
            .times(1)
            .returning(move |_, reason, at| {
                let mut link = link.clone();
                link.deactivate(reason, at);
                Ok(Some(link))
            });

        let service = ShareLinkService::new(Arc::new(repo));
        let link = service.revoke("revokerevoke1234").await.unwrap();
        assert!(link.is_revoked());
    }
}

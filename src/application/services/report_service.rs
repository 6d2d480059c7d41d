//! Public report orchestration: registry, gateway and analytics engine.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use crate::application::services::report_gateway::{
    AuthorizedPage, CredentialStrategy, GatewayError, ReportGateway,
};
use crate::application::services::share_link_service::{LinkValidation, ShareLinkService};
use crate::domain::analytics::{AnalyticsSnapshot, EstimateRatios, compute_with};
use crate::domain::entities::{RawPostRecord, ShareLink};
use crate::domain::repositories::ShareLinkRepository;
use crate::domain::sources::{Credential, ResultsSource, SourceError};
use crate::error::AppError;
use crate::utils::share_id::validate_share_id;

/// Limits and presentation settings for reports and link minting.
#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub page_size: u32,
    pub max_pages: u32,
    pub default_ttl_hours: u32,
    pub max_ttl_hours: u32,
    pub public_base_url: String,
    pub ratios: EstimateRatios,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            page_size: 500,
            max_pages: 100,
            default_ttl_hours: 168,
            max_ttl_hours: 720,
            public_base_url: "http://localhost:3000".to_string(),
            ratios: EstimateRatios::default(),
        }
    }
}

/// A freshly computed public report.
#[derive(Debug, Clone)]
pub struct SharedReport {
    pub link: ShareLink,
    pub analytics: AnalyticsSnapshot,
    pub last_updated: DateTime<Utc>,
}

/// A newly minted share link with its public URL.
#[derive(Debug, Clone)]
pub struct CreatedShareLink {
    pub link: ShareLink,
    pub share_url: String,
}

/// Orchestrates the public report read, revoke and mint paths.
///
/// Every read recomputes from live upstream data; nothing is cached.
pub struct ReportService {
    links: Arc<ShareLinkService<dyn ShareLinkRepository>>,
    gateway: Arc<ReportGateway<dyn ResultsSource>>,
    settings: ReportSettings,
}

impl ReportService {
    pub fn new(
        links: Arc<ShareLinkService<dyn ShareLinkRepository>>,
        gateway: Arc<ReportGateway<dyn ResultsSource>>,
        settings: ReportSettings,
    ) -> Self {
        Self {
            links,
            gateway,
            settings,
        }
    }

    /// Validates a share link and computes its campaign's analytics.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for a malformed identifier
    /// - [`AppError::NotFound`] if the link was never issued
    /// - [`AppError::Gone`] if the link is revoked or expired
    /// - [`AppError::Configuration`] / [`AppError::Upstream`] from the gateway
    pub async fn get_report(
        &self,
        share_id: &str,
        caller: Option<&str>,
    ) -> Result<SharedReport, AppError> {
        if let Err(e) = validate_share_id(share_id) {
            record_outcome("invalid");
            return Err(e);
        }

        let validation = match self.links.validate(share_id).await {
            Ok(validation) => validation,
            Err(e) => {
                record_outcome("store_error");
                return Err(e);
            }
        };

        let link = match validation {
            LinkValidation::Valid(link) => link,
            LinkValidation::NotFound => {
                record_outcome("not_found");
                return Err(AppError::not_found(
                    "Shared report not found",
                    json!({ "share_id": share_id }),
                ));
            }
            LinkValidation::Revoked(_) => {
                record_outcome("revoked");
                return Err(AppError::gone(
                    "This shared report has been revoked",
                    json!({ "share_id": share_id, "reason": "revoked" }),
                ));
            }
            LinkValidation::Expired(link) => {
                record_outcome("expired");
                return Err(AppError::gone(
                    "This shared report has expired",
                    json!({
                        "share_id": share_id,
                        "reason": "expired",
                        "expired_at": link.expires_at,
                    }),
                ));
            }
        };

        let analytics = match self.compute_snapshot(&link.campaign_id, caller).await {
            Ok(analytics) => analytics,
            Err(e) => {
                record_outcome(match &e {
                    AppError::Configuration { .. } => "configuration_error",
                    _ => "upstream_error",
                });
                return Err(e);
            }
        };

        tracing::info!(
            share_id = %share_id,
            campaign_id = %link.campaign_id,
            posts = analytics.total_posts,
            "Shared report computed"
        );
        record_outcome("ok");

        Ok(SharedReport {
            link,
            analytics,
            last_updated: Utc::now(),
        })
    }

    /// Revokes a share link. Succeeds for links that are already inactive.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for a malformed identifier
    /// - [`AppError::NotFound`] if the link was never issued
    pub async fn revoke(&self, share_id: &str) -> Result<ShareLink, AppError> {
        validate_share_id(share_id)?;
        self.links.revoke(share_id).await
    }

    /// Mints a share link for a campaign the caller can read.
    ///
    /// The caller's own bearer credential must be able to read the first
    /// page of the campaign; deployment fallback credentials are not used.
    ///
    /// # Errors
    ///
    /// - [`AppError::Unauthorized`] without a bearer credential or when the
    ///   upstream answers 401
    /// - [`AppError::Forbidden`] when the upstream answers 403
    /// - [`AppError::Validation`] for a TTL above the configured maximum
    /// - [`AppError::Upstream`] on upstream failures
    pub async fn create_share_link(
        &self,
        campaign_id: &str,
        campaign_name: &str,
        expires_in_hours: Option<u32>,
        caller: Option<&str>,
    ) -> Result<CreatedShareLink, AppError> {
        let token = caller
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AppError::unauthorized(
                    "A bearer token is required to share a campaign report",
                    json!({}),
                )
            })?;

        let hours = expires_in_hours.unwrap_or(self.settings.default_ttl_hours);
        if hours == 0 || hours > self.settings.max_ttl_hours {
            return Err(AppError::bad_request(
                "Invalid expiry",
                json!({
                    "expires_in_hours": hours,
                    "max_hours": self.settings.max_ttl_hours,
                }),
            ));
        }

        self.gateway
            .fetch_as(
                CredentialStrategy::Caller,
                &Credential::Bearer(token.to_string()),
                campaign_id,
                1,
                1,
            )
            .await
            .map_err(|e| match e {
                SourceError::Rejected { status: 403 } => AppError::forbidden(
                    "Not allowed to read this campaign",
                    json!({ "campaign_id": campaign_id }),
                ),
                SourceError::Rejected { .. } => AppError::unauthorized(
                    "Credential rejected by the campaign data source",
                    json!({ "campaign_id": campaign_id }),
                ),
                other => GatewayError::from(other).into(),
            })?;

        let link = self
            .links
            .create(campaign_id, campaign_name, Duration::hours(i64::from(hours)))
            .await?;

        let share_url = format!(
            "{}/shared-reports/{}",
            self.settings.public_base_url.trim_end_matches('/'),
            link.id
        );

        Ok(CreatedShareLink { link, share_url })
    }

    /// Fetches every page of a campaign's records and aggregates them.
    ///
    /// # Errors
    ///
    /// - [`AppError::Configuration`] if no credential strategy applies
    /// - [`AppError::Upstream`] on upstream failures or when the page cap is
    ///   reached before the upstream total
    pub async fn compute_snapshot(
        &self,
        campaign_id: &str,
        caller: Option<&str>,
    ) -> Result<AnalyticsSnapshot, AppError> {
        let records = self.fetch_all(campaign_id, caller).await?;
        Ok(compute_with(&records, &self.settings.ratios))
    }

    async fn fetch_all(
        &self,
        campaign_id: &str,
        caller: Option<&str>,
    ) -> Result<Vec<RawPostRecord>, AppError> {
        let limit = self.settings.page_size;

        let AuthorizedPage {
            strategy,
            credential,
            page,
        } = self.gateway.fetch(campaign_id, 1, limit, caller).await?;

        let total = page.total;
        let mut last_len = page.records.len();
        let mut records = page.records;
        let mut page_no = 1;

        while (records.len() as u64) < total && last_len > 0 {
            if page_no >= self.settings.max_pages {
                tracing::warn!(
                    campaign_id = %campaign_id,
                    collected = records.len(),
                    total,
                    "Page cap reached before upstream total"
                );
                return Err(AppError::upstream(
                    "Campaign has more records than the report page cap allows",
                    json!({
                        "collected": records.len(),
                        "total": total,
                        "max_pages": self.settings.max_pages,
                    }),
                ));
            }

            page_no += 1;
            let next = self
                .gateway
                .fetch_as(strategy, &credential, campaign_id, page_no, limit)
                .await
                .map_err(GatewayError::from)?;

            last_len = next.records.len();
            records.extend(next.records);
        }

        Ok(records)
    }

    /// Registry handle, used by the health check and the operator CLI.
    pub fn links(&self) -> &ShareLinkService<dyn ShareLinkRepository> {
        &self.links
    }

    /// Gateway handle, used by the health check.
    pub fn gateway(&self) -> &ReportGateway<dyn ResultsSource> {
        &self.gateway
    }
}

fn record_outcome(outcome: &'static str) {
    metrics::counter!("shared_report_requests_total", "outcome" => outcome).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::report_gateway::GatewaySettings;
    use crate::domain::entities::{Deactivation, ResultsPage};
    use crate::domain::repositories::MockShareLinkRepository;
    use crate::domain::sources::MockResultsSource;

    const SHARE_ID: &str = "shareShare123456";

    fn active_link() -> ShareLink {
        let now = Utc::now();
        ShareLink::new(
            SHARE_ID.to_string(),
            "campaign-1".to_string(),
            "Launch".to_string(),
            now - Duration::hours(1),
            now + Duration::hours(1),
        )
    }

    fn record(username: &str, likes: u64) -> RawPostRecord {
        RawPostRecord::new(json!({ "username": username, "likes": likes, "followers": 100 }))
    }

    fn service(
        repo: MockShareLinkRepository,
        source: MockResultsSource,
        gateway: GatewaySettings,
        settings: ReportSettings,
    ) -> ReportService {
        let repo: Arc<dyn ShareLinkRepository> = Arc::new(repo);
        let source: Arc<dyn ResultsSource> = Arc::new(source);
        ReportService::new(
            Arc::new(ShareLinkService::new(repo)),
            Arc::new(ReportGateway::new(source, gateway)),
            settings,
        )
    }

    fn system_gateway() -> GatewaySettings {
        GatewaySettings {
            system_token: Some("sys".into()),
            timeout: std::time::Duration::from_secs(5),
            ..GatewaySettings::default()
        }
    }

    #[tokio::test]
    async fn test_get_report_fetches_every_page() {
        let mut repo = MockShareLinkRepository::new();
        repo.expect_find().returning(|_| Ok(Some(active_link())));

        let mut source = MockResultsSource::new();
        source
            .expect_fetch_results()
            .withf(|_, page, limit, _| *page == 1 && *limit == 2)
            .times(1)
            .returning(|_, _, _, _| {
                Ok(ResultsPage::new(vec![record("alice", 10), record("bob", 20)], 3))
            });
        source
            .expect_fetch_results()
            .withf(|_, page, _, cred| *page == 2 && *cred == Credential::Bearer("sys".into()))
            .times(1)
            .returning(|_, _, _, _| Ok(ResultsPage::new(vec![record("alice", 5)], 3)));

        let service = service(
            repo,
            source,
            system_gateway(),
            ReportSettings {
                page_size: 2,
                ..ReportSettings::default()
            },
        );

        let report = service.get_report(SHARE_ID, None).await.unwrap();
        assert_eq!(report.link.campaign_id, "campaign-1");
        assert_eq!(report.analytics.total_posts, 3);
        assert_eq!(report.analytics.total_influencers, 2);
        assert_eq!(report.analytics.total_likes, 35);
    }

    #[tokio::test]
    async fn test_get_report_stops_on_empty_page() {
        let mut repo = MockShareLinkRepository::new();
        repo.expect_find().returning(|_| Ok(Some(active_link())));

        let mut source = MockResultsSource::new();
        source
            .expect_fetch_results()
            .withf(|id, page, limit, _| id == "campaign-1" && *page == 1 && *limit == 2)
            .times(1)
            .returning(|_, _, _, _| Ok(ResultsPage::new(vec![record("alice", 1)], 10)));
        source
            .expect_fetch_results()
            .withf(|_, page, _, _| *page == 2)
            .times(1)
            .returning(|_, _, _, _| Ok(ResultsPage::new(vec![], 10)));

        let service = service(
            repo,
            source,
            system_gateway(),
            ReportSettings {
                page_size: 2,
                ..ReportSettings::default()
            },
        );

        let report = service.get_report(SHARE_ID, None).await.unwrap();
        assert_eq!(report.analytics.total_posts, 1);
    }

    #[tokio::test]
    async fn test_get_report_page_cap_is_upstream_error() {
        let mut repo = MockShareLinkRepository::new();
        repo.expect_find().returning(|_| Ok(Some(active_link())));

        let mut source = MockResultsSource::new();
        source
            .expect_fetch_results()
            .times(2)
            .returning(|_, _, _, _| Ok(ResultsPage::new(vec![record("alice", 1)], 100)));

        let service = service(
            repo,
            source,
            system_gateway(),
            ReportSettings {
                page_size: 1,
                max_pages: 2,
                ..ReportSettings::default()
            },
        );

        let err = service.get_report(SHARE_ID, None).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_get_report_unknown_link() {
        let mut repo = MockShareLinkRepository::new();
        repo.expect_find().returning(|_| Ok(None));
        let mut source = MockResultsSource::new();
        source.expect_fetch_results().times(0);

        let service = service(repo, source, system_gateway(), ReportSettings::default());
        let err = service.get_report(SHARE_ID, None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_report_revoked_is_gone() {
        let mut repo = MockShareLinkRepository::new();
        repo.expect_find().returning(|_| {
            let mut link = active_link();
            link.deactivate(Deactivation::Revoked, Utc::now());
            Ok(Some(link))
        });
        let mut source = MockResultsSource::new();
        source.expect_fetch_results().times(0);

        let service = service(repo, source, system_gateway(), ReportSettings::default());
        let err = service.get_report(SHARE_ID, None).await.unwrap_err();
        match err {
            AppError::Gone { details, .. } => assert_eq!(details["reason"], "revoked"),
            other => panic!("expected gone, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_report_malformed_id_skips_registry() {
        let mut repo = MockShareLinkRepository::new();
        repo.expect_find().times(0);

        let service = service(
            repo,
            MockResultsSource::new(),
            system_gateway(),
            ReportSettings::default(),
        );
        let err = service.get_report("bad id!", None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_get_report_without_credentials_needs_configuration() {
        let mut repo = MockShareLinkRepository::new();
        repo.expect_find().returning(|_| Ok(Some(active_link())));
        let mut source = MockResultsSource::new();
        source.expect_fetch_results().times(0);

        let service = service(
            repo,
            source,
            GatewaySettings::default(),
            ReportSettings::default(),
        );
        let err = service.get_report(SHARE_ID, None).await.unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_create_requires_bearer() {
        let service = service(
            MockShareLinkRepository::new(),
            MockResultsSource::new(),
            system_gateway(),
            ReportSettings::default(),
        );

        let err = service
            .create_share_link("campaign-1", "Launch", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_create_uses_only_caller_credential() {
        let mut source = MockResultsSource::new();
        source
            .expect_fetch_results()
            .withf(|_, page, limit, cred| {
                *page == 1 && *limit == 1 && *cred == Credential::Bearer("user".into())
            })
            .times(1)
            .returning(|_, _, _, _| Err(SourceError::Rejected { status: 403 }));

        let service = service(
            MockShareLinkRepository::new(),
            source,
            system_gateway(),
            ReportSettings::default(),
        );

        let err = service
            .create_share_link("campaign-1", "Launch", None, Some("user"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_create_builds_share_url() {
        let mut repo = MockShareLinkRepository::new();
        repo.expect_find().returning(|_| Ok(None));
        repo.expect_create().returning(|link| Ok(link));

        let mut source = MockResultsSource::new();
        source
            .expect_fetch_results()
            .returning(|_, _, _, _| Ok(ResultsPage::default()));

        let service = service(
            repo,
            source,
            GatewaySettings::default(),
            ReportSettings {
                public_base_url: "https://reports.example.com/".into(),
                ..ReportSettings::default()
            },
        );

        let created = service
            .create_share_link("campaign-1", "Launch", Some(24), Some("user"))
            .await
            .unwrap();

        assert_eq!(
            created.share_url,
            format!("https://reports.example.com/shared-reports/{}", created.link.id)
        );
        assert_eq!(
            created.link.expires_at - created.link.created_at,
            Duration::hours(24)
        );
    }

    #[tokio::test]
    async fn test_create_rejects_ttl_above_max() {
        let service = service(
            MockShareLinkRepository::new(),
            MockResultsSource::new(),
            system_gateway(),
            ReportSettings {
                max_ttl_hours: 48,
                ..ReportSettings::default()
            },
        );

        let err = service
            .create_share_link("campaign-1", "Launch", Some(49), Some("user"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_revoke_unknown_is_not_found() {
        let mut repo = MockShareLinkRepository::new();
        repo.expect_deactivate().returning(|_, _, _| Ok(None));

        let service = service(
            repo,
            MockResultsSource::new(),
            system_gateway(),
            ReportSettings::default(),
        );
        let err = service.revoke(SHARE_ID).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    /// Collects the `outcome` label of every shared report request counted.
    struct OutcomeRecorder(Arc<std::sync::Mutex<Vec<String>>>);

    impl metrics::Recorder for OutcomeRecorder {
        fn describe_counter(&self, _: metrics::KeyName, _: Option<metrics::Unit>, _: metrics::SharedString) {}
        fn describe_gauge(&self, _: metrics::KeyName, _: Option<metrics::Unit>, _: metrics::SharedString) {}
        fn describe_histogram(&self, _: metrics::KeyName, _: Option<metrics::Unit>, _: metrics::SharedString) {}

        fn register_counter(&self, key: &metrics::Key, _: &metrics::Metadata<'_>) -> metrics::Counter {
            if key.name() == "shared_report_requests_total" {
                let mut outcomes = self.0.lock().unwrap();
                outcomes.extend(
                    key.labels()
                        .filter(|label| label.key() == "outcome")
                        .map(|label| label.value().to_string()),
                );
            }
            metrics::Counter::noop()
        }

        fn register_gauge(&self, _: &metrics::Key, _: &metrics::Metadata<'_>) -> metrics::Gauge {
            metrics::Gauge::noop()
        }

        fn register_histogram(&self, _: &metrics::Key, _: &metrics::Metadata<'_>) -> metrics::Histogram {
            metrics::Histogram::noop()
        }
    }

    #[test]
    fn test_get_report_counts_store_failures() {
        let mut repo = MockShareLinkRepository::new();
        repo.expect_find()
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let mut source = MockResultsSource::new();
        source.expect_fetch_results().never();

        let service = service(repo, source, system_gateway(), ReportSettings::default());

        let outcomes = Arc::new(std::sync::Mutex::new(Vec::new()));
        let recorder = OutcomeRecorder(outcomes.clone());

        let result = metrics::with_local_recorder(&recorder, || {
            tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap()
                .block_on(service.get_report(SHARE_ID, None))
        });

        assert!(matches!(result, Err(AppError::Internal { .. })));
        assert_eq!(*outcomes.lock().unwrap(), vec!["store_error".to_string()]);
    }
}

//! Report data gateway: fetches campaign records through a credential
//! fallback chain.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use thiserror::Error;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::domain::entities::ResultsPage;
use crate::domain::sources::{Credential, ResultsSource, SourceError};
use crate::error::AppError;

/// Upper bound for a single backoff delay between retries.
const MAX_BACKOFF: Duration = Duration::from_secs(2);

/// One way of authenticating against the upstream source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStrategy {
    /// Bearer token supplied by the caller of this service.
    Caller,
    /// Deployment-wide service token.
    System,
    /// No token; relies on the upstream accepting public reads.
    Anonymous,
    /// Deployment-wide public fallback token.
    Public,
}

impl CredentialStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialStrategy::Caller => "caller",
            CredentialStrategy::System => "system",
            CredentialStrategy::Anonymous => "anonymous",
            CredentialStrategy::Public => "public",
        }
    }
}

/// Gateway failure, as seen by the report orchestration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// No credential strategy applies; the deployment is not set up for
    /// public sharing.
    #[error("no upstream credential is configured for public reports")]
    Configuration,

    /// The upstream failed or refused every attempted credential.
    #[error("{message}")]
    Upstream {
        message: String,
        status: Option<u16>,
    },
}

impl From<SourceError> for GatewayError {
    fn from(e: SourceError) -> Self {
        GatewayError::Upstream {
            status: e.status(),
            message: e.to_string(),
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Configuration => AppError::configuration(
                "No upstream credential is configured for public reports",
                json!({
                    "hint": "set SYSTEM_API_TOKEN, PUBLIC_API_TOKEN or UPSTREAM_ALLOW_ANONYMOUS"
                }),
            ),
            GatewayError::Upstream { message, status } => {
                AppError::upstream(message, json!({ "upstream_status": status }))
            }
        }
    }
}

/// Deployment credentials and limits for the gateway.
#[derive(Clone, Default)]
pub struct GatewaySettings {
    pub system_token: Option<String>,
    pub public_token: Option<String>,
    pub allow_anonymous: bool,
    pub timeout: Duration,
    pub max_retries: usize,
}

impl std::fmt::Debug for GatewaySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewaySettings")
            .field("system_token", &self.system_token.as_ref().map(|_| "***"))
            .field("public_token", &self.public_token.as_ref().map(|_| "***"))
            .field("allow_anonymous", &self.allow_anonymous)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// A page fetched through the fallback chain, together with the strategy
/// that succeeded so follow-up pages can reuse it.
#[derive(Debug, Clone)]
pub struct AuthorizedPage {
    pub strategy: CredentialStrategy,
    pub credential: Credential,
    pub page: ResultsPage,
}

/// Service retrieving raw post records for a campaign on behalf of callers
/// that may hold no credential of their own.
pub struct ReportGateway<S: ResultsSource + ?Sized> {
    source: Arc<S>,
    settings: GatewaySettings,
}

impl<S: ResultsSource + ?Sized> ReportGateway<S> {
    /// Creates a new gateway over `source`.
    pub fn new(source: Arc<S>, settings: GatewaySettings) -> Self {
        Self { source, settings }
    }

    /// Ordered list of strategies applicable to a request.
    ///
    /// Empty and whitespace-only tokens count as absent.
    pub fn plan(&self, caller: Option<&str>) -> Vec<(CredentialStrategy, Credential)> {
        let mut plan = Vec::with_capacity(4);

        if let Some(token) = non_blank(caller) {
            plan.push((CredentialStrategy::Caller, Credential::Bearer(token)));
        }
        if let Some(token) = non_blank(self.settings.system_token.as_deref()) {
            plan.push((CredentialStrategy::System, Credential::Bearer(token)));
        }
        if self.settings.allow_anonymous {
            plan.push((CredentialStrategy::Anonymous, Credential::Anonymous));
        }
        if let Some(token) = non_blank(self.settings.public_token.as_deref()) {
            plan.push((CredentialStrategy::Public, Credential::Bearer(token)));
        }

        plan
    }

    /// Names of the strategies usable without a caller credential.
    pub fn fallback_strategies(&self) -> Vec<&'static str> {
        self.plan(None).iter().map(|(s, _)| s.as_str()).collect()
    }

    /// Fetches one page, trying each applicable credential in order.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::Configuration`] when no strategy applies; no
    ///   upstream call is made.
    /// - [`GatewayError::Upstream`] on the first non-authentication failure,
    ///   or with the last rejection status when every strategy was refused.
    pub async fn fetch(
        &self,
        campaign_id: &str,
        page: u32,
        limit: u32,
        caller: Option<&str>,
    ) -> Result<AuthorizedPage, GatewayError> {
        let plan = self.plan(caller);

        if plan.is_empty() {
            tracing::error!(
                campaign_id = %campaign_id,
                needs_configuration = true,
                "No upstream credential strategy available"
            );
            metrics::counter!(
                "report_upstream_attempts_total",
                "strategy" => "none",
                "outcome" => "configuration_error"
            )
            .increment(1);
            return Err(GatewayError::Configuration);
        }

        let mut last_rejection = None;

        for (strategy, credential) in plan {
            match self
                .attempt(strategy, &credential, campaign_id, page, limit)
                .await
            {
                Ok(page) => {
                    return Ok(AuthorizedPage {
                        strategy,
                        credential,
                        page,
                    });
                }
                Err(e) if e.is_auth_rejection() => {
                    last_rejection = e.status();
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(GatewayError::Upstream {
            message: "Upstream rejected every available credential".to_string(),
            status: last_rejection,
        })
    }

    /// Fetches one page with exactly one credential, without fall-through.
    ///
    /// # Errors
    ///
    /// Returns the raw [`SourceError`] so callers can tell a rejected
    /// credential apart from an outage.
    pub async fn fetch_as(
        &self,
        strategy: CredentialStrategy,
        credential: &Credential,
        campaign_id: &str,
        page: u32,
        limit: u32,
    ) -> Result<ResultsPage, SourceError> {
        self.attempt(strategy, credential, campaign_id, page, limit)
            .await
    }

    /// One strategy attempt: bounded by the timeout, retried on transient
    /// failures with jittered exponential backoff.
    async fn attempt(
        &self,
        strategy: CredentialStrategy,
        credential: &Credential,
        campaign_id: &str,
        page: u32,
        limit: u32,
    ) -> Result<ResultsPage, SourceError> {
        let timeout = self.settings.timeout;
        let backoff = ExponentialBackoff::from_millis(2)
            .factor(50)
            .max_delay(MAX_BACKOFF)
            .map(jitter)
            .take(self.settings.max_retries);

        let result = RetryIf::spawn(
            backoff,
            || async move {
                match tokio::time::timeout(
                    timeout,
                    self.source
                        .fetch_results(campaign_id, page, limit, credential),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => Err(SourceError::Timeout(timeout.as_millis() as u64)),
                }
            },
            |e: &SourceError| {
                let retry = e.is_retryable();
                if retry {
                    tracing::debug!(
                        campaign_id = %campaign_id,
                        strategy = strategy.as_str(),
                        error = %e,
                        "Retrying upstream request"
                    );
                }
                retry
            },
        )
        .await;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) if e.is_auth_rejection() => "rejected",
            Err(_) => "error",
        };

        match &result {
            Ok(fetched) => tracing::debug!(
                campaign_id = %campaign_id,
                strategy = strategy.as_str(),
                page,
                records = fetched.records.len(),
                total = fetched.total,
                "Upstream page fetched"
            ),
            Err(e) if e.is_auth_rejection() => tracing::info!(
                campaign_id = %campaign_id,
                strategy = strategy.as_str(),
                status = e.status(),
                "Upstream rejected credential"
            ),
            Err(e) => tracing::warn!(
                campaign_id = %campaign_id,
                strategy = strategy.as_str(),
                status = e.status(),
                error = %e,
                "Upstream request failed"
            ),
        }

        metrics::counter!(
            "report_upstream_attempts_total",
            "strategy" => strategy.as_str(),
            "outcome" => outcome
        )
        .increment(1);

        result
    }
}

fn non_blank(token: Option<&str>) -> Option<String> {
    token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

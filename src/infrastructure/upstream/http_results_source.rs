//! reqwest client for the upstream campaign results API.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::domain::entities::{RawPostRecord, ResultsPage};
use crate::domain::sources::{Credential, ResultsSource, SourceError};

/// Header sent instead of `Authorization` on anonymous requests.
pub const PUBLIC_ACCESS_HEADER: &str = "X-Public-Access";

/// Longest upstream error text carried into our own errors.
const MAX_ERROR_TEXT: usize = 200;

/// `{success, results[], total, page, limit}`; numbers may arrive as strings.
#[serde_as]
#[derive(Debug, Deserialize)]
struct ResultsEnvelope {
    success: Option<bool>,
    results: Option<Vec<RawPostRecord>>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    total: Option<u64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[allow(dead_code)]
    page: Option<u32>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[allow(dead_code)]
    limit: Option<u32>,
    message: Option<String>,
}

/// Failure to set up the upstream client.
#[derive(Debug, Error)]
pub enum HttpSourceBuildError {
    #[error("upstream URL cannot be used as a base: {0}")]
    InvalidBaseUrl(Url),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Upstream results source over HTTP.
///
/// Requests `GET {base}/campaign/{id}/video-results?page&limit`.
#[derive(Clone)]
pub struct HttpResultsSource {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpResultsSource {
    /// Builds a client whose every request is bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` cannot carry path segments (e.g.
    /// `mailto:`) or the TLS backend cannot be initialized.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, HttpSourceBuildError> {
        if base_url.cannot_be_a_base() {
            return Err(HttpSourceBuildError::InvalidBaseUrl(base_url));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    fn results_url(&self, campaign_id: &str) -> Result<Url, SourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SourceError::InvalidResponse("upstream URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["campaign", campaign_id, "video-results"]);
        Ok(url)
    }
}

#[async_trait]
impl ResultsSource for HttpResultsSource {
    async fn fetch_results(
        &self,
        campaign_id: &str,
        page: u32,
        limit: u32,
        credential: &Credential,
    ) -> Result<ResultsPage, SourceError> {
        let url = self.results_url(campaign_id)?;

        let request = self
            .client
            .get(url)
            .query(&[("page", page), ("limit", limit)]);

        let request = match credential {
            Credential::Bearer(token) => request.bearer_auth(token),
            Credential::Anonymous => request.header(PUBLIC_ACCESS_HEADER, "true"),
        };

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout(u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX))
            } else {
                SourceError::Transport(e.to_string())
            }
        })?;

        let status = response.status();

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(SourceError::Rejected {
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                message: error_text(&body, status),
            });
        }

        let envelope: ResultsEnvelope = response
            .json()
            .await
            .map_err(|e| SourceError::InvalidResponse(e.to_string()))?;

        if envelope.success == Some(false) {
            return Err(SourceError::InvalidResponse(
                envelope
                    .message
                    .unwrap_or_else(|| "upstream reported success=false".to_string()),
            ));
        }

        let records = envelope.results.unwrap_or_default();
        let total = envelope.total.unwrap_or(records.len() as u64);

        Ok(ResultsPage::new(records, total))
    }
}

/// Picks a readable message out of an upstream error body.
fn error_text(body: &str, status: StatusCode) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        error: Option<String>,
    }

    let text = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or_else(|| body.trim().to_string());

    if text.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("upstream error")
            .to_string();
    }

    text.chars().take(MAX_ERROR_TEXT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_accepts_numeric_strings() {
        let envelope: ResultsEnvelope = serde_json::from_str(
            r#"{"success":true,"results":[{"likes":1}],"total":"42","page":"1","limit":50}"#,
        )
        .unwrap();

        assert_eq!(envelope.total, Some(42));
        assert_eq!(envelope.results.unwrap().len(), 1);
    }

    #[test]
    fn test_envelope_tolerates_missing_fields() {
        let envelope: ResultsEnvelope = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(envelope.results.is_none());
        assert!(envelope.total.is_none());
    }

    #[test]
    fn test_results_url_encodes_campaign_id() {
        let source = HttpResultsSource::new(
            Url::parse("https://api.example.com/v1/").unwrap(),
            Duration::from_secs(1),
        )
        .unwrap();

        let url = source.results_url("a b/c").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/campaign/a%20b%2Fc/video-results"
        );
    }

    #[test]
    fn test_new_rejects_non_base_url() {
        let result = HttpResultsSource::new(
            Url::parse("mailto:ops@example.com").unwrap(),
            Duration::from_secs(1),
        );

        assert!(matches!(result, Err(HttpSourceBuildError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_error_text_prefers_message_field() {
        assert_eq!(
            error_text(r#"{"message":"campaign not found"}"#, StatusCode::NOT_FOUND),
            "campaign not found"
        );
        assert_eq!(error_text("", StatusCode::BAD_GATEWAY), "Bad Gateway");
        assert_eq!(error_text(&"x".repeat(500), StatusCode::BAD_GATEWAY).len(), 200);
    }
}

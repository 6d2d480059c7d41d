//! Upstream campaign results source.
//!
//! The upstream "campaign post/video results" API is an external collaborator.
//! This module defines the contract the report gateway talks to; the HTTP
//! implementation lives in [`crate::infrastructure::upstream`].

use crate::domain::entities::ResultsPage;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Credential presented to the upstream for a single request.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// `Authorization: Bearer <token>`.
    Bearer(String),
    /// No credential; the request carries the public-access marker instead.
    Anonymous,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Bearer(_) => f.write_str("Bearer(***)"),
            Credential::Anonymous => f.write_str("Anonymous"),
        }
    }
}

/// Failure of a single upstream request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// The upstream refused the credential (401 or 403).
    #[error("upstream rejected credential ({status})")]
    Rejected { status: u16 },

    /// The upstream answered with a non-success status other than an auth rejection.
    #[error("upstream returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never completed (connect, TLS, reset, ...).
    #[error("upstream transport error: {0}")]
    Transport(String),

    /// The request did not complete within the configured bound.
    #[error("upstream request timed out after {0} ms")]
    Timeout(u64),

    /// The upstream answered but the body was not a usable results envelope.
    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),
}

impl SourceError {
    /// Whether the failure is an authentication rejection that allows the
    /// gateway to try the next credential strategy.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, SourceError::Rejected { .. })
    }

    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SourceError::Transport(_) | SourceError::Timeout(_) => true,
            SourceError::Status { status, .. } => {
                matches!(*status, 408 | 429 | 500 | 502 | 503 | 504)
            }
            SourceError::Rejected { .. } | SourceError::InvalidResponse(_) => false,
        }
    }

    /// Upstream HTTP status, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            SourceError::Rejected { status } | SourceError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Paginated access to a campaign's raw post records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResultsSource: Send + Sync {
    /// Fetches one page of raw post records for a campaign.
    ///
    /// `page` is 1-indexed; `limit` is forwarded unchanged.
    async fn fetch_results(
        &self,
        campaign_id: &str,
        page: u32,
        limit: u32,
        credential: &Credential,
    ) -> Result<ResultsPage, SourceError>;
}

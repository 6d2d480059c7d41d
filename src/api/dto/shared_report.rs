//! DTOs for the shared report endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::{CreatedShareLink, SharedReport};
use crate::domain::analytics::AnalyticsSnapshot;

/// `{ "success": true, "data": ... }` envelope for successful responses.
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// A computed public report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedReportData {
    pub share_id: String,
    pub campaign_id: String,
    pub campaign_name: String,
    pub analytics_data: AnalyticsSnapshot,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl From<SharedReport> for SharedReportData {
    fn from(report: SharedReport) -> Self {
        Self {
            share_id: report.link.id,
            campaign_id: report.link.campaign_id,
            campaign_name: report.link.campaign_name,
            analytics_data: report.analytics,
            created_at: report.link.created_at,
            expires_at: report.link.expires_at,
            last_updated: report.last_updated,
        }
    }
}

/// Response to a revoke request.
#[derive(Debug, Serialize)]
pub struct RevokeResponse {
    pub success: bool,
    pub message: String,
}

/// Request to mint a share link for a campaign.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSharedReportRequest {
    #[validate(length(min = 1, max = 200))]
    pub campaign_name: String,

    /// Link lifetime; the configured default applies when omitted.
    #[validate(range(min = 1))]
    pub expires_in_hours: Option<u32>,
}

/// A newly minted share link.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSharedReportData {
    pub share_id: String,
    pub share_url: String,
    pub campaign_id: String,
    pub campaign_name: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<CreatedShareLink> for CreatedSharedReportData {
    fn from(created: CreatedShareLink) -> Self {
        Self {
            share_id: created.link.id,
            share_url: created.share_url,
            campaign_id: created.link.campaign_id,
            campaign_name: created.link.campaign_name,
            created_at: created.link.created_at,
            expires_at: created.link.expires_at,
        }
    }
}

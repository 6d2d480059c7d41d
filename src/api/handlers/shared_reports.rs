//! Handlers for the shared report endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::shared_report::{
    CreateSharedReportRequest, CreatedSharedReportData, RevokeResponse, SharedReportData,
    SuccessResponse,
};
use crate::api::middleware::CallerCredential;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the live analytics snapshot behind a share link.
///
/// # Endpoint
///
/// `GET /shared-reports/{share_id}`
///
/// No credential is required. A caller that does send
/// `Authorization: Bearer <token>` has it tried first against the upstream.
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "data": {
///     "shareId": "Xk3v9QpL2mN8rT1a",
///     "campaignId": "cmp_42",
///     "campaignName": "Spring Launch",
///     "analyticsData": { "totalPosts": 5, "totalInfluencers": 2, ... },
///     "createdAt": "2026-10-01T10:00:00Z",
///     "expiresAt": "2026-10-08T10:00:00Z",
///     "lastUpdated": "2026-10-02T08:15:03Z"
///   }
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request` for a malformed identifier
/// - `404 Not Found` if the link was never issued
/// - `410 Gone` if the link is revoked or expired (`details.reason`)
/// - `503 Service Unavailable` when no upstream credential is configured
///   (`needsConfiguration: true`) or the upstream fails
pub async fn get_shared_report_handler(
    State(state): State<AppState>,
    Path(share_id): Path<String>,
    caller: CallerCredential,
) -> Result<Json<SuccessResponse<SharedReportData>>, AppError> {
    let report = state.reports.get_report(&share_id, caller.token()).await?;

    Ok(Json(SuccessResponse::new(report.into())))
}

/// Revokes a share link.
///
/// # Endpoint
///
/// `DELETE /shared-reports/{share_id}`
///
/// Idempotent: revoking an already revoked or expired link succeeds.
///
/// # Errors
///
/// - `400 Bad Request` for a malformed identifier
/// - `404 Not Found` if the link was never issued
pub async fn revoke_shared_report_handler(
    State(state): State<AppState>,
    Path(share_id): Path<String>,
) -> Result<Json<RevokeResponse>, AppError> {
    state.reports.revoke(&share_id).await?;

    Ok(Json(RevokeResponse {
        success: true,
        message: "Shared report revoked".to_string(),
    }))
}

/// Mints a share link for a campaign.
///
/// # Endpoint
///
/// `POST /api/campaigns/{campaign_id}/shared-reports`
///
/// # Request Body
///
/// ```json
/// {
///   "campaignName": "Spring Launch",
///   "expiresInHours": 72
/// }
/// ```
///
/// The caller's bearer token must be able to read the campaign upstream.
///
/// # Errors
///
/// - `400 Bad Request` for an invalid body or lifetime
/// - `401 Unauthorized` without a bearer token, or when the upstream rejects it
/// - `403 Forbidden` when the upstream denies access to the campaign
/// - `503 Service Unavailable` on upstream failures
pub async fn create_shared_report_handler(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
    caller: CallerCredential,
    Json(payload): Json<CreateSharedReportRequest>,
) -> Result<(StatusCode, Json<SuccessResponse<CreatedSharedReportData>>), AppError> {
    payload.validate()?;

    let created = state
        .reports
        .create_share_link(
            &campaign_id,
            payload.campaign_name.trim(),
            payload.expires_in_hours,
            caller.token(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::new(created.into())),
    ))
}

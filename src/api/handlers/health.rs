//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Share link store**: reachability of the configured store
/// 2. **Upstream credentials**: at least one strategy usable by anonymous
///    viewers (system token, anonymous reads or public token)
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "shareLinkStore": { "status": "ok", "message": "Reachable" },
///     "upstreamCredentials": { "status": "ok", "message": "Strategies: system, public" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let store_check = check_store(&state).await;
    let credentials_check = check_credentials(&state);

    let all_healthy = store_check.is_ok() && credentials_check.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            share_link_store: store_check,
            upstream_credentials: credentials_check,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_store(state: &AppState) -> CheckStatus {
    if state.share_links.store_healthy().await {
        CheckStatus::ok("Reachable")
    } else {
        CheckStatus::error("Share link store unreachable")
    }
}

fn check_credentials(state: &AppState) -> CheckStatus {
    let strategies = state.gateway.fallback_strategies();

    if strategies.is_empty() {
        CheckStatus::error(
            "No credential for public viewers; set SYSTEM_API_TOKEN, PUBLIC_API_TOKEN or UPSTREAM_ALLOW_ANONYMOUS",
        )
    } else {
        CheckStatus::ok(format!("Strategies: {}", strategies.join(", ")))
    }
}

//! API route configuration.

use crate::api::handlers::{
    create_shared_report_handler, get_shared_report_handler, health_handler,
    revoke_shared_report_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Public shared report routes. No credential required.
///
/// # Endpoints
///
/// - `GET    /shared-reports/{share_id}` - Live analytics behind a share link
/// - `DELETE /shared-reports/{share_id}` - Revoke a share link (idempotent)
pub fn public_routes() -> Router<AppState> {
    Router::new().route(
        "/shared-reports/{share_id}",
        get(get_shared_report_handler).delete(revoke_shared_report_handler),
    )
}

/// Share link minting API, mounted under `/api`.
///
/// # Endpoints
///
/// - `POST /campaigns/{campaign_id}/shared-reports` - Mint a share link (Bearer token required)
pub fn api_routes() -> Router<AppState> {
    Router::new().route(
        "/campaigns/{campaign_id}/shared-reports",
        post(create_shared_report_handler),
    )
}

/// Operational routes.
///
/// - `GET /health` - Store reachability and upstream credential configuration
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}

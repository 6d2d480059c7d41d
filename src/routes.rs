//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET    /shared-reports/{share_id}` - Public report (no credential)
//! - `DELETE /shared-reports/{share_id}` - Revoke a share link
//! - `POST   /api/campaigns/{campaign_id}/shared-reports` - Mint a share link
//! - `GET    /health` - Store and upstream credential checks
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket; stricter on the minting API
//! - **Path normalization** - Trailing slash handling

use crate::api::middleware::{rate_limit, tracing};
use crate::api::routes::{api_routes, health_routes, public_routes};
use crate::state::AppState;
use axum::Router;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// Rate limiting keys on the peer address, so the returned service must be
/// served with connect info (see [`crate::server::run`]).
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let public = public_routes().layer(rate_limit::layer());
    let api = api_routes().layer(rate_limit::secure_layer());

    let router = Router::new()
        .merge(public)
        .merge(health_routes())
        .nest("/api", api)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

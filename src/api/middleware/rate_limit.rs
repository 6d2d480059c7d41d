//! Per-IP rate limiting using the token bucket algorithm.
//!
//! Rate limits are keyed by the socket peer address, so the router must be
//! served with `into_make_service_with_connect_info::<SocketAddr>()`.
//! Requests exceeding the limit receive `429 Too Many Requests`.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::PeerIpKeyExtractor,
};

/// Governor layer keyed by peer IP.
pub type RateLimitLayer =
    GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Rate limiter for the public shared report endpoints: 2 rps, burst 100.
///
/// Every read fans out to the upstream API, so the bucket is sized for a
/// handful of viewers per address rather than for scraping.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/shared-reports/{share_id}", get(get_shared_report_handler))
///     .layer(rate_limit::layer());
/// ```
pub fn layer() -> RateLimitLayer {
    build(2, 100)
}

/// Rate limiter for the share link minting API: 1 rps, burst 10.
pub fn secure_layer() -> RateLimitLayer {
    build(1, 10)
}

fn build(per_second: u64, burst_size: u32) -> RateLimitLayer {
    let config = GovernorConfigBuilder::default()
        .per_second(per_second)
        .burst_size(burst_size)
        .finish()
        .expect("rate limit quota is non-zero");

    GovernorLayer::new(Arc::new(config))
}

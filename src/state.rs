//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::application::services::{
    GatewaySettings, ReportGateway, ReportService, ReportSettings, ShareLinkService,
};
use crate::domain::repositories::ShareLinkRepository;
use crate::domain::sources::ResultsSource;

/// Services wired over the configured share link store and upstream source.
///
/// Cloned per request; every field is an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub share_links: Arc<ShareLinkService<dyn ShareLinkRepository>>,
    pub gateway: Arc<ReportGateway<dyn ResultsSource>>,
    pub reports: Arc<ReportService>,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn ShareLinkRepository>,
        source: Arc<dyn ResultsSource>,
        gateway_settings: GatewaySettings,
        report_settings: ReportSettings,
    ) -> Self {
        let share_links = Arc::new(ShareLinkService::new(repository));
        let gateway = Arc::new(ReportGateway::new(source, gateway_settings));
        let reports = Arc::new(ReportService::new(
            share_links.clone(),
            gateway.clone(),
            report_settings,
        ));

        Self {
            share_links,
            gateway,
            reports,
        }
    }
}

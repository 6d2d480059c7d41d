#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use campaign_reports::api::routes::{api_routes, health_routes, public_routes};
use campaign_reports::application::services::{GatewaySettings, ReportSettings};
use campaign_reports::domain::entities::{Deactivation, RawPostRecord, ResultsPage, ShareLink};
use campaign_reports::domain::repositories::ShareLinkRepository;
use campaign_reports::domain::sources::{Credential, ResultsSource, SourceError};
use campaign_reports::infrastructure::persistence::InMemoryShareLinkRepository;
use campaign_reports::state::AppState;
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const CAMPAIGN_ID: &str = "cmp_42";
pub const SYSTEM_TOKEN: &str = "system-token";
pub const USER_TOKEN: &str = "user-token";

/// One recorded upstream call.
#[derive(Debug, Clone)]
pub struct SourceCall {
    pub campaign_id: String,
    pub page: u32,
    pub limit: u32,
    pub credential: Credential,
}

/// Scripted upstream: serves fixed records per campaign, paginated, to an
/// allow-list of credentials.
#[derive(Default)]
pub struct StubSource {
    records: Mutex<HashMap<String, Vec<Value>>>,
    accepted: Mutex<Vec<Credential>>,
    failure: Mutex<Option<SourceError>>,
    calls: Mutex<Vec<SourceCall>>,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(self, campaign_id: &str, records: Vec<Value>) -> Self {
        self.records
            .lock()
            .unwrap()
            .insert(campaign_id.to_string(), records);
        self
    }

    pub fn accepting(self, credential: Credential) -> Self {
        self.accepted.lock().unwrap().push(credential);
        self
    }

    pub fn failing_with(self, error: SourceError) -> Self {
        *self.failure.lock().unwrap() = Some(error);
        self
    }

    pub fn calls(&self) -> Vec<SourceCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResultsSource for StubSource {
    async fn fetch_results(
        &self,
        campaign_id: &str,
        page: u32,
        limit: u32,
        credential: &Credential,
    ) -> Result<ResultsPage, SourceError> {
        self.calls.lock().unwrap().push(SourceCall {
            campaign_id: campaign_id.to_string(),
            page,
            limit,
            credential: credential.clone(),
        });

        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }

        if !self.accepted.lock().unwrap().contains(credential) {
            return Err(SourceError::Rejected { status: 401 });
        }

        let all = self
            .records
            .lock()
            .unwrap()
            .get(campaign_id)
            .cloned()
            .unwrap_or_default();

        let start = ((page.saturating_sub(1)) as usize) * limit as usize;
        let records = all
            .iter()
            .skip(start)
            .take(limit as usize)
            .cloned()
            .map(RawPostRecord::new)
            .collect();

        Ok(ResultsPage::new(records, all.len() as u64))
    }
}

/// Everything a handler test needs.
pub struct TestContext {
    pub state: AppState,
    pub repo: Arc<InMemoryShareLinkRepository>,
    pub source: Arc<StubSource>,
}

impl TestContext {
    pub fn new(source: StubSource, gateway: GatewaySettings) -> Self {
        Self::with_settings(source, gateway, report_settings())
    }

    pub fn with_settings(
        source: StubSource,
        gateway: GatewaySettings,
        report: ReportSettings,
    ) -> Self {
        let repo = Arc::new(InMemoryShareLinkRepository::new());
        let source = Arc::new(source);

        let state = AppState::new(repo.clone(), source.clone(), gateway, report);

        Self {
            state,
            repo,
            source,
        }
    }

    /// Router with every route and no rate limiting (no peer address in tests).
    pub fn router(&self) -> Router {
        Router::new()
            .merge(public_routes())
            .merge(health_routes())
            .nest("/api", api_routes())
            .with_state(self.state.clone())
    }

    pub async fn insert_link(&self, id: &str, expires_in: Duration) -> ShareLink {
        let now = Utc::now();
        let link = ShareLink::new(
            id.to_string(),
            CAMPAIGN_ID.to_string(),
            "Spring Launch".to_string(),
            now - Duration::hours(1),
            now + expires_in,
        );
        self.repo.create(link).await.unwrap()
    }

    pub async fn insert_revoked_link(&self, id: &str) -> ShareLink {
        self.insert_link(id, Duration::hours(24)).await;
        self.repo
            .deactivate(id, Deactivation::Revoked, Utc::now())
            .await
            .unwrap()
            .unwrap()
    }
}

pub fn system_gateway() -> GatewaySettings {
    GatewaySettings {
        system_token: Some(SYSTEM_TOKEN.to_string()),
        timeout: std::time::Duration::from_secs(5),
        ..GatewaySettings::default()
    }
}

pub fn unconfigured_gateway() -> GatewaySettings {
    GatewaySettings {
        timeout: std::time::Duration::from_secs(5),
        ..GatewaySettings::default()
    }
}

pub fn report_settings() -> ReportSettings {
    ReportSettings {
        public_base_url: "https://reports.example.com".to_string(),
        ..ReportSettings::default()
    }
}

/// 3 posts for alice and 2 for bob.
pub fn alice_and_bob() -> Vec<Value> {
    vec![
        json!({ "username": "alice", "likes": 100, "comments": 10, "followers": 1000, "postId": "a1" }),
        json!({ "username": "alice", "likes": 50, "comments": 5, "followers": 1000, "postId": "a2" }),
        json!({ "username": "alice", "likes": 0, "comments": 0, "followers": 1000, "postId": "a3" }),
        json!({ "username": "bob", "likes": 200, "comments": 20, "followers": 2000, "postId": "b1" }),
        json!({ "username": "bob", "likes": 300, "comments": 30, "followers": 2000, "postId": "b2" }),
    ]
}

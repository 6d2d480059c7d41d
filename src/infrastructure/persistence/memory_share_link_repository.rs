//! In-process share link store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::json;
use std::sync::Arc;

use crate::domain::entities::{Deactivation, ShareLink};
use crate::domain::repositories::ShareLinkRepository;
use crate::error::AppError;

/// Share link store backed by a [`DashMap`].
///
/// Each mutation holds only its key's shard lock, so transitions on one link
/// are linearizable and operations on different links do not serialize on a
/// global lock. State is lost on restart and not shared between instances.
#[derive(Clone, Default)]
pub struct InMemoryShareLinkRepository {
    inner: Arc<DashMap<String, ShareLink>>,
}

impl InMemoryShareLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl ShareLinkRepository for InMemoryShareLinkRepository {
    async fn create(&self, link: ShareLink) -> Result<ShareLink, AppError> {
        match self.inner.entry(link.id.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict(
                "Share id already exists",
                json!({ "share_id": link.id }),
            )),
            Entry::Vacant(slot) => {
                slot.insert(link.clone());
                Ok(link)
            }
        }
    }

    async fn find(&self, id: &str) -> Result<Option<ShareLink>, AppError> {
        Ok(self.inner.get(id).map(|entry| entry.value().clone()))
    }

    async fn deactivate(
        &self,
        id: &str,
        reason: Deactivation,
        at: DateTime<Utc>,
    ) -> Result<Option<ShareLink>, AppError> {
        Ok(self.inner.get_mut(id).map(|mut entry| {
            entry.value_mut().deactivate(reason, at);
            entry.value().clone()
        }))
    }

    async fn list_by_campaign(&self, campaign_id: &str) -> Result<Vec<ShareLink>, AppError> {
        let mut links: Vec<ShareLink> = self
            .inner
            .iter()
            .filter(|entry| entry.value().campaign_id == campaign_id)
            .map(|entry| entry.value().clone())
            .collect();

        links.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(links)
    }

    async fn health_check(&self) -> bool {
        true
    }
}

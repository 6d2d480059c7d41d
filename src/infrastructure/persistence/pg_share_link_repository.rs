//! PostgreSQL implementation of the share link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Deactivation, ShareLink};
use crate::domain::repositories::ShareLinkRepository;
use crate::error::AppError;

/// Row shape of the `share_links` table.
#[derive(Debug, sqlx::FromRow)]
struct ShareLinkRow {
    id: String,
    campaign_id: String,
    campaign_name: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    is_active: bool,
    revoked_at: Option<DateTime<Utc>>,
}

impl From<ShareLinkRow> for ShareLink {
    fn from(row: ShareLinkRow) -> Self {
        ShareLink {
            id: row.id,
            campaign_id: row.campaign_id,
            campaign_name: row.campaign_name,
            created_at: row.created_at,
            expires_at: row.expires_at,
            is_active: row.is_active,
            revoked_at: row.revoked_at,
        }
    }
}

const COLUMNS: &str = "id, campaign_id, campaign_name, created_at, expires_at, is_active, revoked_at";

/// PostgreSQL share link store.
///
/// Deactivation is an optimistic compare-and-swap on `is_active`, so
/// concurrent expiry and revoke from any number of instances settle on a
/// single winner.
pub struct PgShareLinkRepository {
    pool: Arc<PgPool>,
}

impl PgShareLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShareLinkRepository for PgShareLinkRepository {
    async fn create(&self, link: ShareLink) -> Result<ShareLink, AppError> {
        let row = sqlx::query_as::<_, ShareLinkRow>(&format!(
            r#"
            INSERT INTO share_links (id, campaign_id, campaign_name, created_at, expires_at, is_active, revoked_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&link.id)
        .bind(&link.campaign_id)
        .bind(&link.campaign_name)
        .bind(link.created_at)
        .bind(link.expires_at)
        .bind(link.is_active)
        .bind(link.revoked_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find(&self, id: &str) -> Result<Option<ShareLink>, AppError> {
        let row = sqlx::query_as::<_, ShareLinkRow>(&format!(
            "SELECT {COLUMNS} FROM share_links WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn deactivate(
        &self,
        id: &str,
        reason: Deactivation,
        at: DateTime<Utc>,
    ) -> Result<Option<ShareLink>, AppError> {
        let revoked_at = match reason {
            Deactivation::Revoked => Some(at),
            Deactivation::Expired => None,
        };

        let updated = sqlx::query_as::<_, ShareLinkRow>(&format!(
            r#"
            UPDATE share_links
            SET is_active = FALSE, revoked_at = $2
            WHERE id = $1 AND is_active = TRUE
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(revoked_at)
        .fetch_optional(self.pool.as_ref())
        .await?;

        match updated {
            Some(row) => Ok(Some(row.into())),
            // Lost the race or already inactive: report whatever won.
            None => self.find(id).await,
        }
    }

    async fn list_by_campaign(&self, campaign_id: &str) -> Result<Vec<ShareLink>, AppError> {
        let rows = sqlx::query_as::<_, ShareLinkRow>(&format!(
            "SELECT {COLUMNS} FROM share_links WHERE campaign_id = $1 ORDER BY created_at DESC"
        ))
        .bind(campaign_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn health_check(&self) -> bool {
        match sqlx::query("SELECT 1").execute(self.pool.as_ref()).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Share link store health check failed");
                false
            }
        }
    }
}

//! Share link entity representing a public, time-bounded report identifier.

use chrono::{DateTime, Utc};

/// Lifecycle classification of a share link at a given instant.
///
/// `Active` is the only non-terminal state. Once a link is `Revoked` or
/// `Expired` it stays that way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Active,
    Revoked,
    Expired,
}

impl LinkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkStatus::Active => "active",
            LinkStatus::Revoked => "revoked",
            LinkStatus::Expired => "expired",
        }
    }
}

/// Why a link is being switched off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deactivation {
    /// Explicit revoke by an operator or campaign owner.
    Revoked,
    /// Lazy expiry detected while validating the link.
    Expired,
}

/// A public link granting read access to one campaign's analytics.
///
/// `expires_at` is fixed at creation. `is_active` only ever goes from `true`
/// to `false`; `revoked_at` is set only when the deactivation was an explicit
/// revoke, so an inactive link without it is classified as expired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    pub id: String,
    pub campaign_id: String,
    pub campaign_name: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl ShareLink {
    /// Creates a new, active share link.
    pub fn new(
        id: String,
        campaign_id: String,
        campaign_name: String,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            campaign_id,
            campaign_name,
            created_at,
            expires_at,
            is_active: true,
            revoked_at: None,
        }
    }

    /// Returns true if `now` is past the expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Returns true if the link was switched off by an explicit revoke.
    pub fn is_revoked(&self) -> bool {
        !self.is_active && self.revoked_at.is_some()
    }

    /// Classifies the link at `now` without mutating anything.
    ///
    /// An active link whose expiry has passed reports `Expired` even though
    /// the stored flag has not been flipped yet.
    pub fn status_at(&self, now: DateTime<Utc>) -> LinkStatus {
        if !self.is_active {
            if self.revoked_at.is_some() {
                LinkStatus::Revoked
            } else {
                LinkStatus::Expired
            }
        } else if self.is_expired_at(now) {
            LinkStatus::Expired
        } else {
            LinkStatus::Active
        }
    }

    /// Applies a deactivation in place if the link is still active.
    ///
    /// Returns `false` when the link was already inactive, in which case
    /// nothing changes and the earlier classification is kept.
    pub fn deactivate(&mut self, reason: Deactivation, at: DateTime<Utc>) -> bool {
        if !self.is_active {
            return false;
        }

        self.is_active = false;
        if reason == Deactivation::Revoked {
            self.revoked_at = Some(at);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn link(expires_in: Duration) -> ShareLink {
        let now = Utc::now();
        ShareLink::new(
            "abcDEF123456_-xy".to_string(),
            "campaign-1".to_string(),
            "Spring Launch".to_string(),
            now,
            now + expires_in,
        )
    }

    #[test]
    fn test_new_link_is_active() {
        let link = link(Duration::hours(1));
        assert!(link.is_active);
        assert!(link.revoked_at.is_none());
        assert_eq!(link.status_at(Utc::now()), LinkStatus::Active);
    }

    #[test]
    fn test_expiry_is_strictly_after_expires_at() {
        let link = link(Duration::hours(1));
        assert!(!link.is_expired_at(link.expires_at));
        assert!(link.is_expired_at(link.expires_at + Duration::milliseconds(1)));
    }

    #[test]
    fn test_active_but_past_expiry_reports_expired() {
        let link = link(Duration::seconds(-5));
        assert!(link.is_active);
        assert_eq!(link.status_at(Utc::now()), LinkStatus::Expired);
    }

    #[test]
    fn test_revoke_sets_revoked_at() {
        let mut link = link(Duration::hours(1));
        let at = Utc::now();
        assert!(link.deactivate(Deactivation::Revoked, at));
        assert!(!link.is_active);
        assert_eq!(link.revoked_at, Some(at));
        assert!(link.is_revoked());
        assert_eq!(link.status_at(at), LinkStatus::Revoked);
    }

    #[test]
    fn test_expire_leaves_revoked_at_empty() {
        let mut link = link(Duration::seconds(-1));
        assert!(link.deactivate(Deactivation::Expired, Utc::now()));
        assert!(link.revoked_at.is_none());
        assert_eq!(link.status_at(Utc::now()), LinkStatus::Expired);
    }

    #[test]
    fn test_first_deactivation_wins() {
        let mut link = link(Duration::seconds(-1));
        assert!(link.deactivate(Deactivation::Expired, Utc::now()));
        assert!(!link.deactivate(Deactivation::Revoked, Utc::now()));
        assert_eq!(link.status_at(Utc::now()), LinkStatus::Expired);

        let mut revoked = self::link(Duration::hours(1));
        assert!(revoked.deactivate(Deactivation::Revoked, Utc::now()));
        assert!(!revoked.deactivate(Deactivation::Expired, Utc::now()));
        // Still revoked even long after the expiry instant.
        assert_eq!(
            revoked.status_at(revoked.expires_at + Duration::days(30)),
            LinkStatus::Revoked
        );
    }
}

//! Analytics snapshot types produced by the aggregation engine.

use super::estimates::ReachEstimates;
use serde::Serialize;

/// Number of entries kept in each ranking.
pub const TOP_N: usize = 5;

/// Grouping key used for records without a username.
pub const UNKNOWN_INFLUENCER: &str = "unknown";

/// Per-influencer reduction of that influencer's posts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfluencerAggregate {
    /// Lowercased username, or `"unknown"`.
    pub key: String,
    /// Username as first seen in the input, or the key when none was present.
    pub username: String,
    pub display_name: String,
    pub avatar: Option<String>,
    pub verified: bool,
    pub posts: u64,
    pub likes: u64,
    pub comments: u64,
    pub views: u64,
    pub plays: u64,
    /// Largest follower count seen across the influencer's posts.
    pub followers: u64,
    /// Likes plus comments.
    pub engagement: u64,
    /// Mean of the per-post rates of posts with followers; 0 when none had any.
    pub engagement_rate: f64,
    /// Approximation, see [`super::EstimateRatios`].
    pub estimated_clicks: u64,
}

/// A single post as shown in the top-posts ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub post_id: Option<String>,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub thumbnail: Option<String>,
    pub url: Option<String>,
    pub likes: u64,
    pub comments: u64,
    pub views: u64,
    pub plays: u64,
    pub followers: u64,
    pub engagement: u64,
    /// `None` when the post's follower count is zero.
    pub engagement_rate: Option<f64>,
}

/// Campaign-wide analytics computed from the full set of raw post records.
///
/// Recomputed on every request and never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    /// Number of input records.
    pub total_posts: u64,
    /// Number of influencer groups.
    pub total_influencers: u64,
    pub total_likes: u64,
    pub total_comments: u64,
    pub total_views: u64,
    pub total_plays: u64,
    pub total_engagement: u64,
    /// Sum of each influencer's follower count.
    pub total_followers: u64,
    /// Mean per-post engagement rate over posts with followers.
    pub average_engagement_rate: f64,
    pub estimates: ReachEstimates,
    /// Every influencer group in first-seen order.
    pub influencers: Vec<InfluencerAggregate>,
    pub top_performers: Vec<InfluencerAggregate>,
    pub top_posts: Vec<PostSummary>,
}

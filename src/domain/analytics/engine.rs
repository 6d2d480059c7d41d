//! Reduction of raw post records into an [`AnalyticsSnapshot`].

use std::collections::HashMap;

use super::estimates::EstimateRatios;
use super::extract::PostMetrics;
use super::snapshot::{AnalyticsSnapshot, InfluencerAggregate, PostSummary, TOP_N, UNKNOWN_INFLUENCER};
use crate::domain::entities::RawPostRecord;

/// Computes the snapshot with the default estimate ratios.
pub fn compute(records: &[RawPostRecord]) -> AnalyticsSnapshot {
    compute_with(records, &EstimateRatios::default())
}

/// Computes the snapshot for `records`.
///
/// Pure and deterministic: the same input always yields the same output,
/// and malformed records degrade to zero values instead of failing.
pub fn compute_with(records: &[RawPostRecord], ratios: &EstimateRatios) -> AnalyticsSnapshot {
    let posts: Vec<PostMetrics> = records.iter().map(PostMetrics::extract).collect();

    let mut groups: Vec<GroupAccumulator> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let mut totals = Totals::default();

    for post in &posts {
        let key = group_key(post);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(GroupAccumulator::new(key));
            groups.len() - 1
        });
        groups[slot].add(post);
        totals.add(post);
    }

    let influencers: Vec<InfluencerAggregate> =
        groups.into_iter().map(|g| g.finish(ratios)).collect();

    let total_engagement = totals.likes.saturating_add(totals.comments);
    let total_followers = influencers
        .iter()
        .fold(0u64, |acc, i| acc.saturating_add(i.followers));

    let mut top_performers = influencers.clone();
    top_performers.sort_by(|a, b| b.engagement.cmp(&a.engagement));
    top_performers.truncate(TOP_N);

    let mut ranked_posts: Vec<&PostMetrics> = posts.iter().collect();
    ranked_posts.sort_by(|a, b| b.engagement().cmp(&a.engagement()));
    let top_posts = ranked_posts
        .into_iter()
        .take(TOP_N)
        .map(summarize_post)
        .collect();

    AnalyticsSnapshot {
        total_posts: posts.len() as u64,
        total_influencers: influencers.len() as u64,
        total_likes: totals.likes,
        total_comments: totals.comments,
        total_views: totals.views,
        total_plays: totals.plays,
        total_engagement,
        total_followers,
        average_engagement_rate: totals.rates.mean(),
        estimates: ratios.campaign(total_engagement),
        influencers,
        top_performers,
        top_posts,
    }
}

fn group_key(post: &PostMetrics) -> String {
    post.username
        .as_deref()
        .map(str::to_lowercase)
        .unwrap_or_else(|| UNKNOWN_INFLUENCER.to_string())
}

fn summarize_post(post: &PostMetrics) -> PostSummary {
    PostSummary {
        post_id: post.post_id.clone(),
        username: post
            .username
            .clone()
            .unwrap_or_else(|| UNKNOWN_INFLUENCER.to_string()),
        display_name: post.display_name.clone(),
        avatar: post.avatar.clone(),
        thumbnail: post.thumbnail.clone(),
        url: post.url.clone(),
        likes: post.likes,
        comments: post.comments,
        views: post.views,
        plays: post.plays,
        followers: post.followers,
        engagement: post.engagement(),
        engagement_rate: post.engagement_rate(),
    }
}

/// Running mean over the per-post rates that are defined.
#[derive(Debug, Default)]
struct RateMean {
    sum: f64,
    count: u64,
}

impl RateMean {
    fn push(&mut self, rate: Option<f64>) {
        if let Some(rate) = rate {
            self.sum += rate;
            self.count += 1;
        }
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

#[derive(Debug, Default)]
struct Totals {
    likes: u64,
    comments: u64,
    views: u64,
    plays: u64,
    rates: RateMean,
}

impl Totals {
    fn add(&mut self, post: &PostMetrics) {
        self.likes = self.likes.saturating_add(post.likes);
        self.comments = self.comments.saturating_add(post.comments);
        self.views = self.views.saturating_add(post.views);
        self.plays = self.plays.saturating_add(post.plays);
        self.rates.push(post.engagement_rate());
    }
}

struct GroupAccumulator {
    key: String,
    username: Option<String>,
    display_name: Option<String>,
    avatar: Option<String>,
    verified: Option<bool>,
    posts: u64,
    likes: u64,
    comments: u64,
    views: u64,
    plays: u64,
    followers: u64,
    rates: RateMean,
}

impl GroupAccumulator {
    fn new(key: String) -> Self {
        Self {
            key,
            username: None,
            display_name: None,
            avatar: None,
            verified: None,
            posts: 0,
            likes: 0,
            comments: 0,
            views: 0,
            plays: 0,
            followers: 0,
            rates: RateMean::default(),
        }
    }

    fn add(&mut self, post: &PostMetrics) {
        self.posts += 1;
        self.likes = self.likes.saturating_add(post.likes);
        self.comments = self.comments.saturating_add(post.comments);
        self.views = self.views.saturating_add(post.views);
        self.plays = self.plays.saturating_add(post.plays);
        // Same audience on every post: max, never sum.
        self.followers = self.followers.max(post.followers);
        self.rates.push(post.engagement_rate());

        // First non-empty value wins.
        if self.username.is_none() {
            self.username = post.username.clone();
        }
        if self.display_name.is_none() {
            self.display_name = post.display_name.clone();
        }
        if self.avatar.is_none() {
            self.avatar = post.avatar.clone();
        }
        if self.verified.is_none() {
            self.verified = post.verified;
        }
    }

    fn finish(self, ratios: &EstimateRatios) -> InfluencerAggregate {
        let engagement = self.likes.saturating_add(self.comments);
        let username = self.username.unwrap_or_else(|| self.key.clone());
        let display_name = self.display_name.unwrap_or_else(|| username.clone());

        InfluencerAggregate {
            username,
            display_name,
            avatar: self.avatar,
            verified: self.verified.unwrap_or(false),
            posts: self.posts,
            likes: self.likes,
            comments: self.comments,
            views: self.views,
            plays: self.plays,
            followers: self.followers,
            engagement,
            engagement_rate: self.rates.mean(),
            estimated_clicks: ratios.influencer_clicks(engagement),
            key: self.key,
        }
    }
}

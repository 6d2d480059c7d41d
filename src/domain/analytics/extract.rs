//! Typed field extraction for variable-shaped post records.
//!
//! Each metric has an ordered table of extractors (`record -> Option<T>`).
//! [`first_present`] walks the table and returns the first value found, so
//! the order of a table is its precedence. A value that is present but
//! unusable (negative count, empty string, wrong type) counts as absent and
//! lets the next extractor try.

use crate::domain::entities::RawPostRecord;
use serde_json::Value;

/// Reads one candidate field of a record.
pub type Extractor<T> = fn(&Value) -> Option<T>;

/// Returns the first value produced by `extractors`, in order.
pub fn first_present<T>(record: &Value, extractors: &[Extractor<T>]) -> Option<T> {
    extractors.iter().find_map(|extract| extract(record))
}

/// Follows a path of object keys.
fn at<'a>(record: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(record, |value, key| value.get(*key))
}

/// Reads a non-negative count from a number or numeric string.
fn count(record: &Value, path: &[&str]) -> Option<u64> {
    match at(record, path)? {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                Some(v)
            } else {
                let f = n.as_f64()?;
                (f.is_finite() && f >= 0.0).then(|| f.trunc() as u64)
            }
        }
        Value::String(s) => parse_count(s),
        _ => None,
    }
}

fn parse_count(raw: &str) -> Option<u64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    if let Ok(v) = cleaned.parse::<u64>() {
        return Some(v);
    }

    let f = cleaned.parse::<f64>().ok()?;
    (f.is_finite() && f >= 0.0).then(|| f.trunc() as u64)
}

/// Reads a trimmed, non-empty string. Numbers are accepted for identifiers.
fn text(record: &Value, path: &[&str]) -> Option<String> {
    match at(record, path)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn flag(record: &Value, path: &[&str]) -> Option<bool> {
    match at(record, path)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

pub const USERNAME: &[Extractor<String>] = &[
    |r| text(r, &["username"]),
    |r| text(r, &["influencerUsername"]),
    |r| text(r, &["influencer_username"]),
    |r| text(r, &["handle"]),
    |r| text(r, &["influencer", "username"]),
    |r| text(r, &["author", "username"]),
    |r| text(r, &["author", "uniqueId"]),
];

pub const DISPLAY_NAME: &[Extractor<String>] = &[
    |r| text(r, &["influencerName"]),
    |r| text(r, &["name"]),
    |r| text(r, &["displayName"]),
    |r| text(r, &["fullName"]),
    |r| text(r, &["influencer", "name"]),
    |r| text(r, &["influencer", "fullName"]),
    |r| text(r, &["author", "nickname"]),
];

pub const AVATAR: &[Extractor<String>] = &[
    |r| text(r, &["avatar"]),
    |r| text(r, &["avatarUrl"]),
    |r| text(r, &["profilePicture"]),
    |r| text(r, &["profilePicUrl"]),
    |r| text(r, &["influencer", "avatar"]),
    |r| text(r, &["author", "avatarThumb"]),
];

pub const VERIFIED: &[Extractor<bool>] = &[
    |r| flag(r, &["verified"]),
    |r| flag(r, &["isVerified"]),
    |r| flag(r, &["is_verified"]),
    |r| flag(r, &["influencer", "verified"]),
    |r| flag(r, &["author", "verified"]),
];

pub const LIKES: &[Extractor<u64>] = &[
    |r| count(r, &["likes"]),
    |r| count(r, &["likeCount"]),
    |r| count(r, &["like_count"]),
    |r| count(r, &["likesCount"]),
    |r| count(r, &["diggCount"]),
    |r| count(r, &["stats", "likes"]),
    |r| count(r, &["stats", "diggCount"]),
];

pub const COMMENTS: &[Extractor<u64>] = &[
    |r| count(r, &["comments"]),
    |r| count(r, &["commentCount"]),
    |r| count(r, &["comment_count"]),
    |r| count(r, &["commentsCount"]),
    |r| count(r, &["stats", "comments"]),
    |r| count(r, &["stats", "commentCount"]),
];

pub const VIEWS: &[Extractor<u64>] = &[
    |r| count(r, &["views"]),
    |r| count(r, &["viewCount"]),
    |r| count(r, &["view_count"]),
    |r| count(r, &["videoViewCount"]),
    |r| count(r, &["stats", "views"]),
];

pub const PLAYS: &[Extractor<u64>] = &[
    |r| count(r, &["plays"]),
    |r| count(r, &["playCount"]),
    |r| count(r, &["play_count"]),
    |r| count(r, &["videoPlayCount"]),
    |r| count(r, &["stats", "playCount"]),
];

pub const FOLLOWERS: &[Extractor<u64>] = &[
    |r| count(r, &["followers"]),
    |r| count(r, &["followerCount"]),
    |r| count(r, &["follower_count"]),
    |r| count(r, &["followersCount"]),
    |r| count(r, &["influencer", "followers"]),
    |r| count(r, &["influencer", "followerCount"]),
    |r| count(r, &["authorStats", "followerCount"]),
];

pub const POST_ID: &[Extractor<String>] = &[
    |r| text(r, &["postId"]),
    |r| text(r, &["videoId"]),
    |r| text(r, &["id"]),
    |r| text(r, &["_id"]),
    |r| text(r, &["shortcode"]),
];

pub const THUMBNAIL: &[Extractor<String>] = &[
    |r| text(r, &["thumbnail"]),
    |r| text(r, &["thumbnailUrl"]),
    |r| text(r, &["coverUrl"]),
    |r| text(r, &["displayUrl"]),
    |r| text(r, &["video", "cover"]),
];

pub const POST_URL: &[Extractor<String>] = &[
    |r| text(r, &["postUrl"]),
    |r| text(r, &["url"]),
    |r| text(r, &["videoUrl"]),
    |r| text(r, &["webVideoUrl"]),
];

/// Typed view of one raw record after extraction.
///
/// Absent counts are zero and absent text is `None`; extraction never fails.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PostMetrics {
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub verified: Option<bool>,
    pub likes: u64,
    pub comments: u64,
    pub views: u64,
    pub plays: u64,
    pub followers: u64,
    pub post_id: Option<String>,
    pub thumbnail: Option<String>,
    pub url: Option<String>,
}

impl PostMetrics {
    pub fn extract(record: &RawPostRecord) -> Self {
        let r = record.as_value();
        Self {
            username: first_present(r, USERNAME),
            display_name: first_present(r, DISPLAY_NAME),
            avatar: first_present(r, AVATAR),
            verified: first_present(r, VERIFIED),
            likes: first_present(r, LIKES).unwrap_or(0),
            comments: first_present(r, COMMENTS).unwrap_or(0),
            views: first_present(r, VIEWS).unwrap_or(0),
            plays: first_present(r, PLAYS).unwrap_or(0),
            followers: first_present(r, FOLLOWERS).unwrap_or(0),
            post_id: first_present(r, POST_ID),
            thumbnail: first_present(r, THUMBNAIL),
            url: first_present(r, POST_URL),
        }
    }

    /// Likes plus comments.
    pub fn engagement(&self) -> u64 {
        self.likes.saturating_add(self.comments)
    }

    /// `(likes + comments) / followers * 100`, or `None` when there are no
    /// followers to divide by.
    pub fn engagement_rate(&self) -> Option<f64> {
        (self.followers > 0)
            .then(|| self.engagement() as f64 * 100.0 / self.followers as f64)
    }
}

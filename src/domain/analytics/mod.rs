//! Analytics aggregation engine.
//!
//! Turns a campaign's raw post records into an [`AnalyticsSnapshot`]:
//!
//! 1. Extract typed metrics from each record ([`extract`])
//! 2. Group by lowercased username (`"unknown"` when absent)
//! 3. Reduce each group: sums, max followers, mean per-post engagement rate,
//!    first-non-empty display identity
//! 4. Global totals and a post-weighted average engagement rate
//! 5. Fixed-ratio estimates ([`estimates`])
//! 6. Stable top-5 rankings of influencers and posts
//!
//! Everything here is pure; callers can drop a computation at any point.

pub mod engine;
pub mod estimates;
pub mod extract;
pub mod snapshot;

pub use engine::{compute, compute_with};
pub use estimates::{EstimateRatios, ReachEstimates};
pub use extract::PostMetrics;
pub use snapshot::{AnalyticsSnapshot, InfluencerAggregate, PostSummary};

//! Fixed-ratio business estimates derived from measured engagement.
//!
//! None of these values are measured. They are rough approximations agreed
//! with the business side and must always be presented as estimates.

use serde::Serialize;

/// Share of a campaign's total engagement (likes + comments) assumed to turn
/// into link clicks.
pub const DEFAULT_TOTAL_CLICK_RATE: f64 = 0.7;

/// Share of one influencer's engagement assumed to turn into link clicks.
/// Intentionally different from [`DEFAULT_TOTAL_CLICK_RATE`].
pub const DEFAULT_INFLUENCER_CLICK_RATE: f64 = 0.8;

/// Impressions assumed per estimated click.
pub const DEFAULT_IMPRESSIONS_PER_CLICK: f64 = 15.0;

/// Unique reach assumed per impression.
pub const DEFAULT_REACH_PER_IMPRESSION: f64 = 0.65;

/// The ratios used to derive clicks, impressions and reach.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimateRatios {
    pub total_click_rate: f64,
    pub influencer_click_rate: f64,
    pub impressions_per_click: f64,
    pub reach_per_impression: f64,
}

impl Default for EstimateRatios {
    fn default() -> Self {
        Self {
            total_click_rate: DEFAULT_TOTAL_CLICK_RATE,
            influencer_click_rate: DEFAULT_INFLUENCER_CLICK_RATE,
            impressions_per_click: DEFAULT_IMPRESSIONS_PER_CLICK,
            reach_per_impression: DEFAULT_REACH_PER_IMPRESSION,
        }
    }
}

impl EstimateRatios {
    /// Estimated clicks for a single influencer's engagement.
    pub fn influencer_clicks(&self, engagement: u64) -> u64 {
        round_count(engagement as f64 * self.influencer_click_rate)
    }

    /// Campaign-wide click, impression and reach estimates.
    ///
    /// Impressions and reach are derived from the unrounded click figure;
    /// only the reported values are rounded.
    pub fn campaign(&self, total_engagement: u64) -> ReachEstimates {
        let clicks = total_engagement as f64 * self.total_click_rate;
        let impressions = clicks * self.impressions_per_click;
        let reach = impressions * self.reach_per_impression;

        ReachEstimates {
            clicks: round_count(clicks),
            impressions: round_count(impressions),
            reach: round_count(reach),
            approximate: true,
        }
    }
}

/// Campaign-wide derived estimates. Always flagged `approximate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReachEstimates {
    pub clicks: u64,
    pub impressions: u64,
    pub reach: u64,
    pub approximate: bool,
}

fn round_count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

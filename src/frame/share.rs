use anyhow::{Context, Result};
use reqwest::Url;

use crate::config::FrameConfig;
use crate::models::stats::{UserStatsRecord, format_amount, format_score};

/// Query parameter names understood by the share route.
pub mod params {
    pub const FID: &str = "fid";
    pub const TODAY: &str = "today";
    pub const LIFETIME: &str = "lifetime";
    pub const NAME: &str = "name";
    pub const FAR_SCORE: &str = "farscore";
}

/// Builds the compose link behind the "Share" button and the share-frame URL
/// it embeds.
#[derive(Debug, Clone)]
pub struct ShareLinks {
    compose: Url,
    share_frame: Url,
    tagline: String,
    fallback_text: String,
}

impl ShareLinks {
    pub fn new(config: &FrameConfig) -> Result<Self> {
        let compose = Url::parse(&config.share_compose_url)
            .with_context(|| format!("Invalid share compose URL {}", config.share_compose_url))?;
        let share_route = config.route_url("share");
        let share_frame = Url::parse(&share_route)
            .with_context(|| format!("Invalid share frame URL {share_route}"))?;
        Ok(Self {
            compose,
            share_frame,
            tagline: config.share_tagline.clone(),
            fallback_text: config.share_fallback_text.clone(),
        })
    }

    pub fn share_text(&self, stats: Option<&UserStatsRecord>) -> String {
        match stats {
            Some(stats) => format!(
                "I've earned {} $MOXIE today and {} $MOXIE all-time 😏! {}",
                format_amount(stats.today_earnings),
                format_amount(stats.lifetime_earnings),
                self.tagline
            ),
            None => self.fallback_text.clone(),
        }
    }

    /// URL of the share frame. Already formatted fields ride along so the
    /// share route can render without a second upstream call.
    pub fn share_frame_url(&self, fid: &str, stats: Option<&UserStatsRecord>) -> String {
        let mut url = self.share_frame.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair(params::FID, fid);
            if let Some(stats) = stats {
                pairs.append_pair(params::TODAY, &format_amount(stats.today_earnings));
                pairs.append_pair(params::LIFETIME, &format_amount(stats.lifetime_earnings));
                if let Some(name) = &stats.profile_name {
                    pairs.append_pair(params::NAME, name);
                }
                if let Some(score) = stats.far_score {
                    pairs.append_pair(params::FAR_SCORE, &format_score(score));
                }
            }
        }
        url.to_string()
    }

    pub fn compose_url(&self, fid: &str, stats: Option<&UserStatsRecord>) -> String {
        let mut url = self.compose.clone();
        url.query_pairs_mut()
            .append_pair("text", &self.share_text(stats))
            .append_pair("embeds[]", &self.share_frame_url(fid, stats));
        url.to_string()
    }
}

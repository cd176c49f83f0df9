use crate::config::FrameConfig;
use crate::models::stats::{
    StatField, StatsSelection, UserStatsRecord, format_amount, format_score,
};

use super::share::ShareLinks;
use super::{FrameButton, FrameView};

pub const LOOKUP_FAILED_MESSAGE: &str = "Error: Unable to load $MOXIE stats right now";
pub const NO_DATA_MESSAGE: &str = "No user data available";
pub const RENDER_ERROR_MESSAGE: &str = "Something went wrong drawing this frame";

pub fn home(config: &FrameConfig) -> FrameView {
    FrameView {
        image: config.home_image.clone(),
        avatar: None,
        heading: config.title.clone(),
        lines: Vec::new(),
        buttons: vec![FrameButton::post("Check stats", config.route_url("check"))],
    }
}

pub fn check_missing_fid(config: &FrameConfig) -> FrameView {
    FrameView {
        image: config.home_image.clone(),
        avatar: None,
        heading: "Error: No FID".to_string(),
        lines: Vec::new(),
        buttons: vec![FrameButton::post("Back", config.route_url(""))],
    }
}

pub fn share_missing_fid(config: &FrameConfig) -> FrameView {
    FrameView {
        image: config.home_image.clone(),
        avatar: None,
        heading: "Error: No FID provided".to_string(),
        lines: Vec::new(),
        buttons: vec![FrameButton::post("Check Your Stats", config.route_url("check"))],
    }
}

/// Served in place of any view that fails to render.
pub fn render_error(config: &FrameConfig) -> FrameView {
    FrameView {
        image: config.home_image.clone(),
        avatar: None,
        heading: "Render Error".to_string(),
        lines: vec![RENDER_ERROR_MESSAGE.to_string()],
        buttons: vec![
            FrameButton::post("Back", config.route_url("")),
            FrameButton::post("Retry", config.route_url("check")),
        ],
    }
}

/// Result of the check action. `stats` is `None` when the lookup failed.
pub fn check_result(
    config: &FrameConfig,
    links: &ShareLinks,
    selection: &StatsSelection,
    fid: &str,
    stats: Option<&UserStatsRecord>,
) -> FrameView {
    let (heading, lines) = match stats {
        Some(stats) => (handle(stats), stat_lines(selection, fid, stats)),
        None => (
            "@Unknown".to_string(),
            vec![format!("FID: {fid}"), LOOKUP_FAILED_MESSAGE.to_string()],
        ),
    };

    FrameView {
        image: config.stats_image.clone(),
        avatar: stats.and_then(|stats| stats.profile_image.clone()),
        heading,
        lines,
        buttons: vec![
            FrameButton::post("Back", config.route_url("")),
            FrameButton::post("Refresh", config.route_url("check")),
            FrameButton::link("Share", links.compose_url(fid, stats)),
        ],
    }
}

pub fn share_result(
    config: &FrameConfig,
    selection: &StatsSelection,
    fid: &str,
    stats: Option<&UserStatsRecord>,
) -> FrameView {
    let (heading, lines) = match stats {
        Some(stats) => (handle(stats), stat_lines(selection, fid, stats)),
        None => (
            "@Unknown".to_string(),
            vec![format!("FID: {fid}"), NO_DATA_MESSAGE.to_string()],
        ),
    };

    FrameView {
        image: config.stats_image.clone(),
        avatar: stats.and_then(|stats| stats.profile_image.clone()),
        heading,
        lines,
        buttons: vec![FrameButton::post("Check Your Stats", config.route_url("check"))],
    }
}

fn handle(stats: &UserStatsRecord) -> String {
    format!("@{}", stats.profile_name.as_deref().unwrap_or("Unknown"))
}

fn stat_lines(selection: &StatsSelection, fid: &str, stats: &UserStatsRecord) -> Vec<String> {
    let mut lines = vec![format!("FID: {fid}")];
    if let Some(score) = stats.far_score {
        lines.push(format!("Farscore: {}", format_score(score)));
    }
    if let Some(boost) = stats.far_boost {
        lines.push(format!("FarBoost: {}", format_score(boost)));
    }
    if let Some(rank) = stats.far_rank {
        lines.push(format!("FarRank: #{rank:.0}"));
    }
    if let Some(tvl) = stats.tvl {
        lines.push(format!("TVL: {}", format_amount(tvl)));
    }
    lines.push(format!("{} $MOXIE today", format_amount(stats.today_earnings)));
    lines.push(format!(
        "{} $MOXIE all-time",
        format_amount(stats.lifetime_earnings)
    ));
    if selection.contains(StatField::MoxieClaimed) {
        lines.push(format!("{} $MOXIE claimed", format_amount(stats.moxie_claimed)));
    }
    if let Some(in_process) = stats.moxie_in_process {
        lines.push(format!("{} $MOXIE in process", format_amount(in_process)));
    }
    lines
}

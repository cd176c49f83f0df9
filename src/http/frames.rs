//! Frame routes: home, check and share.
//!
//! Upstream and render failures never surface as HTTP errors here. They are
//! logged and rendered as an error view that still offers a way back.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::frame::{FrameView, views};
use crate::models::stats::{StatField, StatsSelection, UserStatsRecord, parse_amount};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home).post(home))
        .route("/check", post(check))
        .route("/share", get(share))
}

async fn home(State(state): State<AppState>) -> Html<String> {
    render(&state, &views::home(&state.frames.config))
}

async fn check(
    State(state): State<AppState>,
    payload: Result<Json<FrameActionPayload>, JsonRejection>,
) -> Html<String> {
    let frames = &state.frames;
    let fid = match payload {
        Ok(Json(payload)) => payload
            .untrusted_data
            .and_then(|data| data.fid)
            .and_then(Fid::into_text),
        Err(rejection) => {
            warn!("Rejected frame action payload: {rejection}");
            None
        }
    };
    let Some(fid) = fid else {
        warn!("No FID found in frame action");
        return render(&state, &views::check_missing_fid(&frames.config));
    };

    info!(%fid, "Fetching earnings for frame check");
    let stats = match state.stats.fetch_stats(&fid).await {
        Ok(stats) => Some(stats),
        Err(err) => {
            error!(%fid, "Earnings lookup failed: {err}");
            None
        }
    };

    let view = views::check_result(
        &frames.config,
        &frames.links,
        state.stats.selection(),
        &fid,
        stats.as_ref(),
    );
    render(&state, &view)
}

async fn share(
    State(state): State<AppState>,
    params: Result<Query<ShareParams>, QueryRejection>,
) -> Html<String> {
    let frames = &state.frames;
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => {
            warn!("Rejected share query: {rejection}");
            ShareParams::default()
        }
    };
    let Some(fid) = non_empty(params.fid.clone()) else {
        return render(&state, &views::share_missing_fid(&frames.config));
    };

    if let Some(stats) = params.shared_stats() {
        let view = views::share_result(&frames.config, &shared_selection(), &fid, Some(&stats));
        return render(&state, &view);
    }

    let stats = match state.stats.fetch_stats(&fid).await {
        Ok(stats) => Some(stats),
        Err(err) => {
            error!(%fid, "Error fetching user info for share: {err}");
            None
        }
    };
    let view = views::share_result(
        &frames.config,
        state.stats.selection(),
        &fid,
        stats.as_ref(),
    );
    render(&state, &view)
}

fn render(state: &AppState, view: &FrameView) -> Html<String> {
    Html(state.frames.renderer.render_or_fallback(view))
}

/// Fields the share URL can carry.
fn shared_selection() -> StatsSelection {
    StatsSelection::new([
        StatField::ProfileName,
        StatField::TodayEarnings,
        StatField::LifetimeEarnings,
        StatField::FarScore,
    ])
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Frame action body posted by the client when a button is pressed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrameActionPayload {
    #[serde(default)]
    untrusted_data: Option<UntrustedData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UntrustedData {
    #[serde(default)]
    fid: Option<Fid>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Fid {
    Number(u64),
    Text(String),
}

impl Fid {
    fn into_text(self) -> Option<String> {
        match self {
            Fid::Number(fid) => Some(fid.to_string()),
            Fid::Text(text) => non_empty(Some(text)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ShareParams {
    fid: Option<String>,
    today: Option<String>,
    lifetime: Option<String>,
    name: Option<String>,
    farscore: Option<String>,
}

impl ShareParams {
    /// Stats precomputed by the check view, when both earnings are present.
    fn shared_stats(&self) -> Option<UserStatsRecord> {
        let today = parse_amount(self.today.as_deref()?).ok()?;
        let lifetime = parse_amount(self.lifetime.as_deref()?).ok()?;
        Some(UserStatsRecord {
            profile_name: non_empty(self.name.clone()),
            today_earnings: today,
            lifetime_earnings: lifetime,
            far_score: self
                .farscore
                .as_deref()
                .and_then(|score| score.trim().parse::<f64>().ok())
                .filter(|score| score.is_finite()),
            ..UserStatsRecord::default()
        })
    }
}

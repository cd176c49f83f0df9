use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::stats::UserStatsRecord;
use crate::state::AppState;

use super::HttpError;

pub fn router() -> Router<AppState> {
    Router::new().route("/stats/{fid}", get(get_stats))
}

async fn get_stats(
    Path(fid): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, HttpError> {
    let fid = fid.trim().to_string();
    if fid.is_empty() {
        return Err(HttpError::new(
            StatusCode::BAD_REQUEST,
            "FID must not be empty".to_string(),
        ));
    }

    let stats = state
        .stats
        .fetch_stats(&fid)
        .await
        .map_err(|err| HttpError::new(StatusCode::BAD_GATEWAY, err.to_string()))?;

    Ok(Json(StatsResponse {
        fid,
        fetched_at: Utc::now(),
        stats,
    }))
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    fid: String,
    fetched_at: DateTime<Utc>,
    stats: UserStatsRecord,
}

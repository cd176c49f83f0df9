//! Earnings lookup against the Airstack GraphQL API.
//!
//! One batched query per call, no retries and no caching. Missing rows fall
//! back to the defaults in [`StatField::fallback`]; transport and protocol
//! failures surface as [`UpstreamError`].

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};

use crate::config::UpstreamConfig;
use crate::models::stats::{Fallback, StatField, StatsSelection, UserStatsRecord, parse_amount};

mod query;
mod wire;

use query::{GraphQlRequest, QueryVariables, build_query};
use wire::{GraphQlResponse, RawAmount, StatsData, first_row};

/// Longest slice of an upstream error body kept in [`UpstreamError::Status`].
const MAX_ERROR_BODY_LEN: usize = 512;

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("upstream returned HTTP {status}")]
    Status { status: StatusCode, body: String },
    #[error("upstream response could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("upstream reported errors: {}", .messages.join("; "))]
    GraphQl { messages: Vec<String> },
    #[error("upstream response carried no data")]
    MissingData,
    #[error("upstream returned a malformed {field} amount: {value:?}")]
    InvalidAmount { field: &'static str, value: String },
}

#[derive(Clone)]
pub struct StatsClient {
    inner: Client,
    endpoint: String,
    api_key: Arc<str>,
    selection: Arc<StatsSelection>,
    query: Arc<str>,
    timeout: Duration,
}

impl StatsClient {
    pub fn new(config: &UpstreamConfig, selection: StatsSelection) -> Result<Self> {
        assert!(!config.url.is_empty(), "Upstream endpoint must be provided");
        assert!(!selection.is_empty(), "Stats selection must not be empty");
        let timeout = config.request_timeout();

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .with_context(|| format!("Failed to build HTTP client for {}", config.url))?;

        let query = build_query(&selection);
        Ok(Self {
            inner: client,
            endpoint: config.url.clone(),
            api_key: Arc::from(config.api_key.as_str()),
            selection: Arc::new(selection),
            query: Arc::from(query),
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        assert!(
            self.timeout >= Duration::from_millis(100),
            "Timeout invariant broken"
        );
        self.timeout
    }

    pub fn selection(&self) -> &StatsSelection {
        &self.selection
    }

    /// Fetches and normalizes the statistics for `fid`.
    ///
    /// The identifier is passed through untouched. An unknown FID and a FID
    /// with no recorded activity both produce an all-defaults record.
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    pub async fn fetch_stats(&self, fid: &str) -> Result<UserStatsRecord, UpstreamError> {
        let request = GraphQlRequest {
            query: self.query.to_string(),
            variables: QueryVariables { fid },
        };

        debug!("Sending earnings query");
        let response = self
            .inner
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, self.api_key.as_ref())
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                warn!("Upstream transport failure: {err}");
                UpstreamError::Transport(err)
            })?;

        let status = response.status();
        debug!(%status, "Received upstream response");
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY_LEN {
                let mut cut = MAX_ERROR_BODY_LEN;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            warn!(%status, %body, "Upstream returned non-success status");
            return Err(UpstreamError::Status { status, body });
        }

        let decoded: GraphQlResponse = response.json().await.map_err(UpstreamError::Decode)?;
        if let Some(errors) = decoded.errors.filter(|errors| !errors.is_empty()) {
            let messages: Vec<String> = errors.into_iter().map(|err| err.message).collect();
            warn!(count = messages.len(), "Upstream reported GraphQL errors");
            return Err(UpstreamError::GraphQl { messages });
        }
        let data = decoded.data.ok_or(UpstreamError::MissingData)?;

        normalize(&self.selection, data)
    }
}

fn normalize(
    selection: &StatsSelection,
    data: StatsData,
) -> Result<UserStatsRecord, UpstreamError> {
    let social = first_row(data.social_info.and_then(|block| block.social)).unwrap_or_default();
    let score = social.farcaster_score.unwrap_or_default();
    let today = first_row(data.today_earnings.and_then(|block| block.rows))
        .and_then(|row| row.all_earnings_amount);
    let lifetime = first_row(data.lifetime_earnings.and_then(|block| block.rows))
        .and_then(|row| row.all_earnings_amount);
    let (claimed, in_process) = first_row(data.claim_details.and_then(|block| block.rows))
        .map(|row| (row.claimed_amount, row.processing_amount))
        .unwrap_or_default();

    Ok(UserStatsRecord {
        profile_name: selection.keep(StatField::ProfileName, non_empty(social.profile_name)),
        profile_image: selection.keep(StatField::ProfileImage, non_empty(social.profile_image)),
        today_earnings: counted(selection, StatField::TodayEarnings, today)?,
        lifetime_earnings: counted(selection, StatField::LifetimeEarnings, lifetime)?,
        far_score: selection.keep(StatField::FarScore, score.far_score),
        far_boost: selection.keep(StatField::FarBoost, score.far_boost),
        far_rank: selection.keep(StatField::FarRank, score.far_rank),
        tvl: optional(selection, StatField::Tvl, score.tvl)?,
        moxie_claimed: counted(selection, StatField::MoxieClaimed, claimed)?,
        moxie_in_process: optional(selection, StatField::MoxieInProcess, in_process)?,
    })
}

fn optional(
    selection: &StatsSelection,
    field: StatField,
    raw: Option<RawAmount>,
) -> Result<Option<Decimal>, UpstreamError> {
    let Some(text) = selection.keep(field, raw).and_then(RawAmount::into_text) else {
        return Ok(None);
    };
    parse_amount(&text)
        .map(Some)
        .map_err(|_| UpstreamError::InvalidAmount {
            field: field.as_str(),
            value: text,
        })
}

fn counted(
    selection: &StatsSelection,
    field: StatField,
    raw: Option<RawAmount>,
) -> Result<Decimal, UpstreamError> {
    assert_eq!(
        field.fallback(),
        Fallback::Zero,
        "{} is not a counted field",
        field.as_str()
    );
    Ok(optional(selection, field, raw)?.unwrap_or(Decimal::ZERO))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

//! Response shapes returned by the Airstack GraphQL API.
//!
//! Every block is optional: the upstream omits blocks it has no rows for and
//! blocks that were not requested never appear.

use serde::Deserialize;
use serde_json::Number;

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<StatsData>,
    #[serde(default)]
    pub errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsData {
    #[serde(default)]
    pub social_info: Option<SocialBlock>,
    #[serde(default)]
    pub today_earnings: Option<EarningStatsBlock>,
    #[serde(default)]
    pub lifetime_earnings: Option<EarningStatsBlock>,
    #[serde(default)]
    pub claim_details: Option<ClaimDetailsBlock>,
}

#[derive(Debug, Deserialize)]
pub struct SocialBlock {
    #[serde(rename = "Social", default)]
    pub social: Option<Vec<SocialRow>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialRow {
    #[serde(default)]
    pub profile_name: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub farcaster_score: Option<FarcasterScore>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarcasterScore {
    #[serde(default)]
    pub far_score: Option<f64>,
    #[serde(default)]
    pub far_boost: Option<f64>,
    #[serde(default)]
    pub far_rank: Option<f64>,
    #[serde(default)]
    pub tvl: Option<RawAmount>,
}

#[derive(Debug, Deserialize)]
pub struct EarningStatsBlock {
    #[serde(rename = "FarcasterMoxieEarningStat", default)]
    pub rows: Option<Vec<EarningStatRow>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningStatRow {
    #[serde(default)]
    pub all_earnings_amount: Option<RawAmount>,
}

#[derive(Debug, Deserialize)]
pub struct ClaimDetailsBlock {
    #[serde(rename = "FarcasterMoxieClaimDetails", default)]
    pub rows: Option<Vec<ClaimDetailsRow>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimDetailsRow {
    #[serde(default)]
    pub claimed_amount: Option<RawAmount>,
    #[serde(default)]
    pub processing_amount: Option<RawAmount>,
}

/// Amounts usually arrive as decimal strings but some fields are plain numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Text(String),
    Number(Number),
}

impl RawAmount {
    /// The textual form, or `None` when the upstream sent an empty string.
    pub fn into_text(self) -> Option<String> {
        match self {
            RawAmount::Text(text) if text.trim().is_empty() => None,
            RawAmount::Text(text) => Some(text),
            RawAmount::Number(number) => Some(number.to_string()),
        }
    }
}

/// Takes the first row of an upstream result list, if there is one.
pub fn first_row<T>(rows: Option<Vec<T>>) -> Option<T> {
    rows.and_then(|rows| rows.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_partial_payload() {
        let body = r#"{
            "data": {
                "socialInfo": { "Social": null },
                "todayEarnings": { "FarcasterMoxieEarningStat": [ { "allEarningsAmount": "12.5" } ] },
                "lifetimeEarnings": null
            }
        }"#;
        let response: GraphQlResponse = serde_json::from_str(body).expect("decodes");
        assert!(response.errors.is_none());
        let data = response.data.expect("data present");
        assert!(first_row(data.social_info.and_then(|b| b.social)).is_none());
        let today = first_row(data.today_earnings.and_then(|b| b.rows)).expect("row");
        assert_eq!(
            today.all_earnings_amount.and_then(RawAmount::into_text).as_deref(),
            Some("12.5")
        );
        assert!(data.lifetime_earnings.is_none());
    }

    #[test]
    fn numeric_and_empty_amounts() {
        let numeric: RawAmount = serde_json::from_str("42.25").expect("number");
        assert_eq!(numeric.into_text().as_deref(), Some("42.25"));
        let empty: RawAmount = serde_json::from_str(r#""  ""#).expect("string");
        assert!(empty.into_text().is_none());
    }

    #[test]
    fn first_row_ignores_trailing_rows() {
        assert_eq!(first_row(Some(vec![1, 2, 3])), Some(1));
        assert_eq!(first_row::<u8>(Some(Vec::new())), None);
        assert_eq!(first_row::<u8>(None), None);
    }
}

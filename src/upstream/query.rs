use std::fmt::Write as _;

use serde::Serialize;

use crate::models::stats::{StatField, StatsSelection};

pub const OPERATION_NAME: &str = "MoxieEarnings";

#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: String,
    pub variables: QueryVariables<'a>,
}

#[derive(Debug, Serialize)]
pub struct QueryVariables<'a> {
    pub fid: &'a str,
}

/// Builds the single batched document for `selection`. Blocks whose fields
/// were not selected are left out of the query.
pub fn build_query(selection: &StatsSelection) -> String {
    assert!(!selection.is_empty(), "Stats selection must not be empty");

    let mut doc = format!("query {OPERATION_NAME}($fid: String!) {{\n");

    if selection.wants_profile() {
        doc.push_str(
            "  socialInfo: Socials(\n    input: {filter: {dappName: {_eq: farcaster}, userId: {_eq: $fid}}, blockchain: ethereum}\n  ) {\n    Social {\n",
        );
        for (field, name) in [
            (StatField::ProfileName, "profileName"),
            (StatField::ProfileImage, "profileImage"),
        ] {
            if selection.contains(field) {
                let _ = writeln!(doc, "      {name}");
            }
        }
        if selection.wants_score() {
            doc.push_str("      farcasterScore {\n");
            for (field, name) in [
                (StatField::FarScore, "farScore"),
                (StatField::FarBoost, "farBoost"),
                (StatField::FarRank, "farRank"),
                (StatField::Tvl, "tvl"),
            ] {
                if selection.contains(field) {
                    let _ = writeln!(doc, "        {name}");
                }
            }
            doc.push_str("      }\n");
        }
        doc.push_str("    }\n  }\n");
    }

    for (field, alias, timeframe) in [
        (StatField::TodayEarnings, "todayEarnings", "TODAY"),
        (StatField::LifetimeEarnings, "lifetimeEarnings", "LIFETIME"),
    ] {
        if selection.contains(field) {
            let _ = write!(
                doc,
                "  {alias}: FarcasterMoxieEarningStats(\n    input: {{timeframe: {timeframe}, blockchain: ALL, filter: {{entityType: {{_eq: USER}}, entityId: {{_eq: $fid}}}}}}\n  ) {{\n    FarcasterMoxieEarningStat {{\n      allEarningsAmount\n    }}\n  }}\n"
            );
        }
    }

    if selection.wants_claims() {
        doc.push_str(
            "  claimDetails: FarcasterMoxieClaimDetails(\n    input: {filter: {fid: {_eq: $fid}}, blockchain: ALL}\n  ) {\n    FarcasterMoxieClaimDetails {\n",
        );
        for (field, name) in [
            (StatField::MoxieClaimed, "claimedAmount"),
            (StatField::MoxieInProcess, "processingAmount"),
        ] {
            if selection.contains(field) {
                let _ = writeln!(doc, "      {name}");
            }
        }
        doc.push_str("    }\n  }\n");
    }

    doc.push_str("}\n");
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selection_matches_earnings_tracker_query() {
        let query = build_query(&StatsSelection::default());
        assert!(query.starts_with("query MoxieEarnings($fid: String!) {"));
        assert!(query.contains("socialInfo: Socials("));
        assert!(query.contains("profileName"));
        assert!(query.contains("profileImage"));
        assert!(query.contains("farcasterScore {"));
        assert!(query.contains("farScore"));
        assert!(!query.contains("farBoost"));
        assert!(query.contains("todayEarnings: FarcasterMoxieEarningStats("));
        assert!(query.contains("timeframe: TODAY"));
        assert!(query.contains("lifetimeEarnings: FarcasterMoxieEarningStats("));
        assert!(query.contains("timeframe: LIFETIME"));
        assert!(!query.contains("claimDetails"));
    }

    #[test]
    fn unselected_blocks_are_omitted() {
        let selection = StatsSelection::new([StatField::TodayEarnings, StatField::MoxieInProcess]);
        let query = build_query(&selection);
        assert!(!query.contains("Socials"));
        assert!(!query.contains("LIFETIME"));
        assert!(query.contains("claimDetails: FarcasterMoxieClaimDetails("));
        assert!(query.contains("processingAmount"));
        assert!(!query.contains("claimedAmount"));
    }

    #[test]
    fn braces_are_balanced() {
        let query = build_query(&StatsSelection::all());
        let open = query.matches('{').count();
        let close = query.matches('}').count();
        assert_eq!(open, close);
    }

    #[test]
    fn request_body_carries_query_and_variables() {
        let request = GraphQlRequest {
            query: build_query(&StatsSelection::default()),
            variables: QueryVariables { fid: "12345" },
        };
        let body = serde_json::to_value(&request).expect("serializes");
        assert_eq!(body["variables"]["fid"], "12345");
        assert!(body["query"].as_str().unwrap().contains(OPERATION_NAME));
    }
}

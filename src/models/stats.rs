use std::collections::BTreeSet;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimals used whenever an amount or score is displayed.
pub const DISPLAY_DECIMALS: u32 = 2;

/// A statistic that a deployment may request from the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatField {
    ProfileName,
    ProfileImage,
    TodayEarnings,
    LifetimeEarnings,
    FarScore,
    FarBoost,
    FarRank,
    Tvl,
    MoxieClaimed,
    MoxieInProcess,
}

/// Value a field takes when the upstream response has nothing for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    Zero,
    Absent,
}

impl StatField {
    pub const ALL: [StatField; 10] = [
        StatField::ProfileName,
        StatField::ProfileImage,
        StatField::TodayEarnings,
        StatField::LifetimeEarnings,
        StatField::FarScore,
        StatField::FarBoost,
        StatField::FarRank,
        StatField::Tvl,
        StatField::MoxieClaimed,
        StatField::MoxieInProcess,
    ];

    pub const fn fallback(self) -> Fallback {
        match self {
            StatField::TodayEarnings | StatField::LifetimeEarnings | StatField::MoxieClaimed => {
                Fallback::Zero
            }
            _ => Fallback::Absent,
        }
    }

    /// Fields served by the `farcasterScore` sub-block of a social profile.
    pub const fn is_score(self) -> bool {
        matches!(
            self,
            StatField::FarScore | StatField::FarBoost | StatField::FarRank | StatField::Tvl
        )
    }

    pub const fn is_profile(self) -> bool {
        matches!(self, StatField::ProfileName | StatField::ProfileImage) || self.is_score()
    }

    pub const fn is_claim(self) -> bool {
        matches!(self, StatField::MoxieClaimed | StatField::MoxieInProcess)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            StatField::ProfileName => "profile_name",
            StatField::ProfileImage => "profile_image",
            StatField::TodayEarnings => "today_earnings",
            StatField::LifetimeEarnings => "lifetime_earnings",
            StatField::FarScore => "far_score",
            StatField::FarBoost => "far_boost",
            StatField::FarRank => "far_rank",
            StatField::Tvl => "tvl",
            StatField::MoxieClaimed => "moxie_claimed",
            StatField::MoxieInProcess => "moxie_in_process",
        }
    }
}

/// The set of fields a lookup requests. Unselected fields are never queried
/// and always resolve to their fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatsSelection {
    fields: BTreeSet<StatField>,
}

impl StatsSelection {
    pub fn new(fields: impl IntoIterator<Item = StatField>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    pub fn all() -> Self {
        Self::new(StatField::ALL)
    }

    pub fn contains(&self, field: StatField) -> bool {
        self.fields.contains(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = StatField> + '_ {
        self.fields.iter().copied()
    }

    pub fn wants_profile(&self) -> bool {
        self.iter().any(StatField::is_profile)
    }

    pub fn wants_score(&self) -> bool {
        self.iter().any(StatField::is_score)
    }

    pub fn wants_claims(&self) -> bool {
        self.iter().any(StatField::is_claim)
    }

    /// Keeps `value` only when `field` was requested.
    pub fn keep<T>(&self, field: StatField, value: Option<T>) -> Option<T> {
        if self.contains(field) { value } else { None }
    }
}

impl Default for StatsSelection {
    fn default() -> Self {
        Self::new([
            StatField::ProfileName,
            StatField::ProfileImage,
            StatField::TodayEarnings,
            StatField::LifetimeEarnings,
            StatField::FarScore,
        ])
    }
}

/// Normalized, display-ready statistics for one FID.
///
/// `Default` is the all-fallbacks record: zero for earnings and claimed
/// amounts, absent for everything else.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsRecord {
    pub profile_name: Option<String>,
    pub profile_image: Option<String>,
    pub today_earnings: Decimal,
    pub lifetime_earnings: Decimal,
    pub far_score: Option<f64>,
    pub far_boost: Option<f64>,
    pub far_rank: Option<f64>,
    pub tvl: Option<Decimal>,
    pub moxie_claimed: Decimal,
    pub moxie_in_process: Option<Decimal>,
}

/// Largest scale a `Decimal` can hold.
const MAX_SCALE: u32 = 28;

/// Parses an upstream amount. Accepts plain decimals and scientific notation.
///
/// Scientific amounts finer than [`MAX_SCALE`] decimals are rounded to it,
/// so dust below `1e-28` reads as zero instead of failing.
pub fn parse_amount(raw: &str) -> Result<Decimal, rust_decimal::Error> {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed).or_else(|_| match Decimal::from_scientific(trimmed) {
        Err(rust_decimal::Error::ScaleExceedsMaximumPrecision(_)) => round_scientific(trimmed),
        parsed => parsed,
    })
}

fn round_scientific(raw: &str) -> Result<Decimal, rust_decimal::Error> {
    let malformed = || rust_decimal::Error::ConversionTo(format!("amount {raw:?}"));
    let (mantissa, exponent) = raw.split_once(['e', 'E']).ok_or_else(malformed)?;
    let mantissa = Decimal::from_str(mantissa)?;
    let exponent: i64 = exponent.parse().map_err(|_| malformed())?;

    let excess = i64::from(mantissa.scale()) - exponent - i64::from(MAX_SCALE);
    if excess <= 0 {
        return Decimal::from_scientific(raw);
    }
    // 10^38 is the largest power of ten an i128 holds; anything past it is zero.
    if excess > 38 {
        return Ok(Decimal::ZERO);
    }

    let divisor = 10i128.pow(excess as u32);
    let digits = mantissa.mantissa();
    let mut quotient = digits / divisor;
    let remainder = (digits % divisor).abs();
    if remainder >= divisor - remainder {
        quotient += digits.signum();
    }
    Decimal::try_from_i128_with_scale(quotient, MAX_SCALE)
}

pub fn format_amount(value: Decimal) -> String {
    let rounded =
        value.round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}

pub fn format_score(value: f64) -> String {
    format!("{value:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record_matches_fallback_table() {
        let record = UserStatsRecord::default();
        for field in StatField::ALL {
            let zero = match field {
                StatField::TodayEarnings => record.today_earnings.is_zero(),
                StatField::LifetimeEarnings => record.lifetime_earnings.is_zero(),
                StatField::MoxieClaimed => record.moxie_claimed.is_zero(),
                _ => false,
            };
            let absent = match field {
                StatField::ProfileName => record.profile_name.is_none(),
                StatField::ProfileImage => record.profile_image.is_none(),
                StatField::FarScore => record.far_score.is_none(),
                StatField::FarBoost => record.far_boost.is_none(),
                StatField::FarRank => record.far_rank.is_none(),
                StatField::Tvl => record.tvl.is_none(),
                StatField::MoxieInProcess => record.moxie_in_process.is_none(),
                _ => false,
            };
            match field.fallback() {
                Fallback::Zero => assert!(zero, "{} should default to zero", field.as_str()),
                Fallback::Absent => assert!(absent, "{} should default to absent", field.as_str()),
            }
        }
    }

    #[test]
    fn amounts_keep_fractional_precision() {
        assert_eq!(format_amount(parse_amount("12.5").unwrap()), "12.50");
        assert_eq!(format_amount(parse_amount("340.75").unwrap()), "340.75");
        assert_eq!(format_amount(parse_amount("0").unwrap()), "0.00");
        assert_eq!(format_amount(parse_amount("1.005").unwrap()), "1.01");
        assert_eq!(
            format_amount(parse_amount("123456789012345.678").unwrap()),
            "123456789012345.68"
        );
        assert_eq!(parse_amount("340.75").unwrap().to_string(), "340.75");
    }

    #[test]
    fn scientific_amounts_parse() {
        assert_eq!(format_amount(parse_amount("1.5e2").unwrap()), "150.00");
        assert!(parse_amount("not-a-number").is_err());
    }

    #[test]
    fn dust_amounts_round_to_zero() {
        assert_eq!(parse_amount("1e-30").unwrap(), Decimal::ZERO);
        assert_eq!(parse_amount("9.999999999999999e-31").unwrap(), Decimal::ZERO);
        assert_eq!(format_amount(parse_amount("1e-30").unwrap()), "0.00");

        let finest = parse_amount("1.5e-28").unwrap();
        assert_eq!(finest, Decimal::new(2, 28));
        assert!(parse_amount("1.5e-x").is_err());
    }

    #[test]
    fn selection_groups_fields_by_block() {
        let selection = StatsSelection::new([StatField::TodayEarnings, StatField::Tvl]);
        assert!(selection.wants_profile());
        assert!(selection.wants_score());
        assert!(!selection.wants_claims());
        assert_eq!(selection.keep(StatField::Tvl, Some(1)), Some(1));
        assert_eq!(selection.keep(StatField::FarRank, Some(1)), None);
    }

    #[test]
    fn selection_deserializes_from_field_names() {
        let selection: StatsSelection =
            serde_json::from_str(r#"["today_earnings", "moxie_claimed", "today_earnings"]"#)
                .expect("selection parses");
        assert_eq!(selection.len(), 2);
        assert!(selection.wants_claims());
        assert!(!selection.wants_profile());
    }

    #[test]
    fn record_serializes_amounts_as_strings() {
        let record = UserStatsRecord {
            today_earnings: parse_amount("12.5").unwrap(),
            ..UserStatsRecord::default()
        };
        let json = serde_json::to_value(&record).expect("serializes");
        assert_eq!(json["todayEarnings"], "12.5");
        assert!(json["profileName"].is_null());
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical location snapshot as delivered by a reference data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub zip: String,
    pub city: String,
    pub state: String,
    /// Signed so upstream garbage reaches the estimator, which rejects it.
    pub population: i64,
    pub urbanicity: Urbanicity,
    pub competitor_count: Option<u32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Urban flag used to gate SAM. Anything other than "Urban" is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Urbanicity {
    Urban,
    Other(String),
}

impl Urbanicity {
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("urban") {
            Self::Urban
        } else {
            Self::Other(trimmed.to_string())
        }
    }

    pub fn is_urban(&self) -> bool {
        matches!(self, Self::Urban)
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Urban => "Urban",
            Self::Other(value) => value,
        }
    }
}

impl From<String> for Urbanicity {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Urbanicity> for String {
    fn from(value: Urbanicity) -> Self {
        value.label().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreDimension {
    Divorce,
    Income,
}

impl ScoreDimension {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Divorce => "divorce rate",
            Self::Income => "household income",
        }
    }
}

impl fmt::Display for ScoreDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One precomputed per-zip score for a single dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub zip: String,
    pub score: f64,
}

impl ScoreRecord {
    pub fn new(zip: impl Into<String>, score: f64) -> Self {
        Self {
            zip: zip.into(),
            score,
        }
    }
}

/// Parse a score stored as text. Missing or non-numeric values count as 0.
pub fn parse_score(raw: Option<&str>) -> f64 {
    raw.map(str::trim)
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Low,
    Medium,
    High,
}

impl Tier {
    pub const fn ordered() -> [Self; 3] {
        [Self::Low, Self::Medium, Self::High]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Inclusive bands 1-7, 8-14, 15-20. Fractional scores fall into the band
    /// whose lower bound they have reached; anything below 1 or above 20 has no tier.
    pub fn classify(composite_score: f64) -> Option<Self> {
        if !(1.0..=20.0).contains(&composite_score) {
            None
        } else if composite_score < 8.0 {
            Some(Self::Low)
        } else if composite_score < 15.0 {
            Some(Self::Medium)
        } else {
            Some(Self::High)
        }
    }

    pub fn from_name(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "med" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Households, TAM and SAM for one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MarketSize {
    pub households: u64,
    pub tam: u64,
    pub sam: u64,
}

/// Fully derived, per-query view of one location's opportunity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeInsight {
    pub zip: String,
    pub city: String,
    pub state: String,
    pub population: u64,
    pub urbanicity: Urbanicity,
    pub competitor_count: Option<u32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub divorce_score: f64,
    pub income_score: f64,
    pub composite_score: f64,
    pub tier: Option<Tier>,
    pub households: u64,
    pub tam: u64,
    pub sam: u64,
}

/// One row of the divorce-rate time series, keyed by state code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivorceRateRecord {
    pub state_code: String,
    pub year: i32,
    pub rate: f64,
}

/// Household count for one income bracket in one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeBracketRecord {
    pub state: String,
    pub city: String,
    pub bracket: String,
    pub households: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries_are_inclusive() {
        assert_eq!(Tier::classify(0.0), None);
        assert_eq!(Tier::classify(1.0), Some(Tier::Low));
        assert_eq!(Tier::classify(7.0), Some(Tier::Low));
        assert_eq!(Tier::classify(8.0), Some(Tier::Medium));
        assert_eq!(Tier::classify(14.0), Some(Tier::Medium));
        assert_eq!(Tier::classify(15.0), Some(Tier::High));
        assert_eq!(Tier::classify(20.0), Some(Tier::High));
        assert_eq!(Tier::classify(21.0), None);
        assert_eq!(Tier::classify(-3.0), None);
        assert_eq!(Tier::classify(f64::NAN), None);
    }

    #[test]
    fn fractional_scores_use_lower_band_edges() {
        assert_eq!(Tier::classify(7.5), Some(Tier::Low));
        assert_eq!(Tier::classify(14.5), Some(Tier::Medium));
        assert_eq!(Tier::classify(20.5), None);
    }

    #[test]
    fn score_text_falls_back_to_zero() {
        assert_eq!(parse_score(Some(" 4.5 ")), 4.5);
        assert_eq!(parse_score(Some("n/a")), 0.0);
        assert_eq!(parse_score(Some("")), 0.0);
        assert_eq!(parse_score(Some("NaN")), 0.0);
        assert_eq!(parse_score(None), 0.0);
    }

    #[test]
    fn urbanicity_matches_case_insensitively() {
        assert!(Urbanicity::parse(" urban ").is_urban());
        let rural = Urbanicity::parse("Rural");
        assert!(!rural.is_urban());
        assert_eq!(rural.label(), "Rural");
    }

    #[test]
    fn tier_names_parse() {
        assert_eq!(Tier::from_name("HIGH"), Some(Tier::High));
        assert_eq!(Tier::from_name("med"), Some(Tier::Medium));
        assert_eq!(Tier::from_name("all"), None);
    }
}

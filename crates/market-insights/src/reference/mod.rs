//! Reference data boundary.
//!
//! Backends hand the pipeline canonical records only. Legacy column names,
//! casing differences and text-encoded numbers are resolved here, never in
//! the scoring code.

mod csv_store;
mod normalizer;
mod parser;
mod states;

use crate::insights::domain::{
    DivorceRateRecord, IncomeBracketRecord, LocationRecord, ScoreDimension, ScoreRecord,
};
use serde::Deserialize;
use std::future::Future;

pub use csv_store::{CsvReferenceStore, CsvReferenceStoreBuilder, ReferenceFiles};
pub use parser::SkippedRow;
pub use states::{state_code, state_name};

/// State/city selection forwarded to the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LocationQuery {
    /// State name or two-letter code, matched exactly (case-insensitive).
    #[serde(default)]
    pub state: Option<String>,
    /// Partial, case-insensitive city match.
    #[serde(default)]
    pub city: Option<String>,
}

impl LocationQuery {
    pub fn new(state: Option<String>, city: Option<String>) -> Self {
        let non_blank = |value: Option<String>| value.filter(|value| !value.trim().is_empty());
        Self {
            state: non_blank(state),
            city: non_blank(city),
        }
    }

    pub fn matches_state(&self, state: &str) -> bool {
        match &self.state {
            None => true,
            Some(wanted) => {
                if normalizer::normalize_text(wanted) == normalizer::normalize_text(state) {
                    return true;
                }
                matches!(
                    (state_code(wanted), state_code(state)),
                    (Some(left), Some(right)) if left == right
                )
            }
        }
    }

    pub fn matches_city(&self, city: &str) -> bool {
        match &self.city {
            None => true,
            Some(wanted) => normalizer::contains_text(city, wanted),
        }
    }

    pub fn matches(&self, state: &str, city: &str) -> bool {
        self.matches_state(state) && self.matches_city(city)
    }
}

/// Failure to obtain reference rows.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("failed to read reference data: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid reference CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("reference data unavailable: {0}")]
    Unavailable(String),
}

/// Source of raw reference rows. Query mechanics belong to the backend; the
/// pipeline only relies on the filters described on each method.
///
/// Methods return `Send` futures so a provider can sit behind an axum handler.
pub trait ReferenceDataProvider: Send + Sync {
    /// Locations matching the state/city selection.
    fn locations(
        &self,
        query: LocationQuery,
    ) -> impl Future<Output = Result<Vec<LocationRecord>, ProviderError>> + Send + '_;

    /// Scores for one dimension restricted to exactly `zips`.
    fn scores(
        &self,
        dimension: ScoreDimension,
        zips: Vec<String>,
    ) -> impl Future<Output = Result<Vec<ScoreRecord>, ProviderError>> + Send + '_;

    /// Every divorce-rate row, all states and years.
    fn divorce_rates(
        &self,
    ) -> impl Future<Output = Result<Vec<DivorceRateRecord>, ProviderError>> + Send + '_;

    /// Income-bracket rows for the state/city selection.
    fn income_brackets(
        &self,
        query: LocationQuery,
    ) -> impl Future<Output = Result<Vec<IncomeBracketRecord>, ProviderError>> + Send + '_;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_filters_are_dropped() {
        let query = LocationQuery::new(Some("  ".to_string()), Some(String::new()));
        assert_eq!(query, LocationQuery::default());
        assert!(query.matches("Texas", "Austin"));
    }

    #[test]
    fn state_matches_by_name_or_code() {
        let by_code = LocationQuery::new(Some("fl".to_string()), None);
        assert!(by_code.matches_state("Florida"));
        assert!(!by_code.matches_state("Georgia"));

        let by_name = LocationQuery::new(Some("florida".to_string()), None);
        assert!(by_name.matches_state("FL"));
    }

    #[test]
    fn city_matches_partially() {
        let query = LocationQuery::new(Some("Florida".to_string()), Some("lauder".to_string()));
        assert!(query.matches("Florida", "Fort Lauderdale"));
        assert!(!query.matches("Florida", "Miami"));
        assert!(!query.matches("Texas", "Lauderdale Lakes"));
    }
}

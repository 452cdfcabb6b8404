use super::domain::{CompositeInsight, LocationRecord, ScoreDimension, ScoreRecord, Tier};
use super::market;
use super::report::PipelineWarning;
use crate::reference::ProviderError;
use std::collections::HashMap;
use tracing::warn;

/// Result of fetching one score dimension from the provider.
pub type ScoreFetch = Result<Vec<ScoreRecord>, ProviderError>;

/// zip -> score for a single dimension.
///
/// Duplicate zips resolve last-write-wins in provider row order. Providers do
/// not promise an order, so duplicates are effectively unspecified.
#[derive(Debug, Default, Clone)]
pub struct ScoreLookup {
    scores: HashMap<String, f64>,
}

impl ScoreLookup {
    pub fn from_records(records: &[ScoreRecord]) -> Self {
        let mut scores = HashMap::with_capacity(records.len());
        for record in records {
            scores.insert(record.zip.clone(), record.score);
        }
        Self { scores }
    }

    /// A failed fetch degrades to an empty lookup and records a warning.
    pub fn from_fetch(
        dimension: ScoreDimension,
        fetch: ScoreFetch,
        warnings: &mut Vec<PipelineWarning>,
    ) -> Self {
        match fetch {
            Ok(records) => Self::from_records(&records),
            Err(err) => {
                warn!(%dimension, error = %err, "score fetch failed, defaulting dimension to 0");
                warnings.push(PipelineWarning::DimensionUnavailable {
                    dimension,
                    reason: err.to_string(),
                });
                Self::default()
            }
        }
    }

    pub fn score(&self, zip: &str) -> f64 {
        self.scores.get(zip).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// A location joined with both score dimensions, before market sizing.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredLocation<'a> {
    pub location: &'a LocationRecord,
    pub divorce_score: f64,
    pub income_score: f64,
    pub composite_score: f64,
}

pub fn join_scores<'a>(
    locations: &'a [LocationRecord],
    divorce: &ScoreLookup,
    income: &ScoreLookup,
) -> Vec<ScoredLocation<'a>> {
    locations
        .iter()
        .map(|location| {
            let divorce_score = divorce.score(&location.zip);
            let income_score = income.score(&location.zip);
            ScoredLocation {
                location,
                divorce_score,
                income_score,
                composite_score: divorce_score + income_score,
            }
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct AggregateOutcome {
    pub insights: Vec<CompositeInsight>,
    pub warnings: Vec<PipelineWarning>,
}

/// Join, score and size every location. Rows the estimator rejects are skipped.
pub fn aggregate(
    locations: &[LocationRecord],
    divorce: ScoreFetch,
    income: ScoreFetch,
) -> AggregateOutcome {
    let mut warnings = Vec::new();
    let divorce = ScoreLookup::from_fetch(ScoreDimension::Divorce, divorce, &mut warnings);
    let income = ScoreLookup::from_fetch(ScoreDimension::Income, income, &mut warnings);

    let mut insights = Vec::with_capacity(locations.len());
    for scored in join_scores(locations, &divorce, &income) {
        let location = scored.location;
        let size = match market::estimate(
            location.population,
            scored.composite_score,
            &location.urbanicity,
        ) {
            Ok(size) => size,
            Err(err) => {
                warn!(zip = %location.zip, error = %err, "skipping location");
                warnings.push(PipelineWarning::RowSkipped {
                    zip: location.zip.clone(),
                    reason: err.to_string(),
                });
                continue;
            }
        };

        insights.push(CompositeInsight {
            zip: location.zip.clone(),
            city: location.city.clone(),
            state: location.state.clone(),
            population: location.population.unsigned_abs(),
            urbanicity: location.urbanicity.clone(),
            competitor_count: location.competitor_count,
            latitude: location.latitude,
            longitude: location.longitude,
            divorce_score: scored.divorce_score,
            income_score: scored.income_score,
            composite_score: scored.composite_score,
            tier: Tier::classify(scored.composite_score),
            households: size.households,
            tam: size.tam,
            sam: size.sam,
        });
    }

    AggregateOutcome { insights, warnings }
}

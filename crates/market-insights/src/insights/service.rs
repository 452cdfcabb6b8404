use std::sync::Arc;

use tracing::{debug, info, warn};

use super::aggregate::{aggregate, AggregateOutcome};
use super::domain::ScoreDimension;
use super::filter::{filter_by_tier, paginate, sort_by_sam, Page, PageError, TierSelection, UnknownTier};
use super::report::{DataStatus, InsightsReport, InsightsSummary, SeriesReport};
use super::series::{self, DivorceRatePoint, IncomeBracketPoint};
use crate::reference::{state_code, LocationQuery, ReferenceDataProvider};

/// Everything one dashboard refresh depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightFilters {
    pub location: LocationQuery,
    pub tiers: TierSelection,
    /// 1-indexed.
    pub page: usize,
    pub per_page: usize,
}

impl InsightFilters {
    pub fn new(location: LocationQuery, per_page: usize) -> Self {
        Self {
            location,
            tiers: TierSelection::All,
            page: 1,
            per_page,
        }
    }

    pub fn with_tiers(mut self, tiers: TierSelection) -> Self {
        self.tiers = tiers;
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    fn validate(&self) -> Result<(), PageError> {
        if self.page == 0 {
            return Err(PageError::ZeroPage);
        }
        if self.per_page == 0 {
            return Err(PageError::ZeroPageSize);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InsightsError {
    #[error(transparent)]
    Page(#[from] PageError),
    #[error(transparent)]
    Tier(#[from] UnknownTier),
    #[error("unknown state '{0}'")]
    UnknownState(String),
}

/// Runs the fetch -> join -> size -> filter -> rank -> page pipeline.
///
/// Stateless between calls: every query works on a fresh provider snapshot.
pub struct InsightsService<P> {
    provider: Arc<P>,
    default_page_size: usize,
}

impl<P> InsightsService<P>
where
    P: ReferenceDataProvider + 'static,
{
    pub fn new(provider: Arc<P>, default_page_size: usize) -> Self {
        Self {
            provider,
            default_page_size: default_page_size.max(1),
        }
    }

    pub fn default_page_size(&self) -> usize {
        self.default_page_size
    }

    pub fn default_filters(&self) -> InsightFilters {
        InsightFilters::new(LocationQuery::default(), self.default_page_size)
    }

    /// Build the ranked, paginated opportunity report for `filters`.
    ///
    /// Only invalid filters are errors. Provider failures surface as
    /// [`DataStatus::Unavailable`] or as warnings.
    pub async fn query(&self, filters: &InsightFilters) -> Result<InsightsReport, InsightsError> {
        filters.validate()?;

        let locations = match self.provider.locations(filters.location.clone()).await {
            Ok(locations) => locations,
            Err(err) => {
                warn!(error = %err, "location fetch failed");
                return Ok(empty_report(
                    DataStatus::Unavailable {
                        reason: err.to_string(),
                    },
                    filters,
                ));
            }
        };

        if locations.is_empty() {
            info!(state = ?filters.location.state, city = ?filters.location.city, "no locations for filter");
            return Ok(empty_report(DataStatus::NoData, filters));
        }

        let zips: Vec<String> = locations.iter().map(|location| location.zip.clone()).collect();
        let (divorce, income) = tokio::join!(
            self.provider.scores(ScoreDimension::Divorce, zips.clone()),
            self.provider.scores(ScoreDimension::Income, zips),
        );

        let AggregateOutcome { insights, warnings } = aggregate(&locations, divorce, income);
        let mut selected = filter_by_tier(insights, &filters.tiers);
        sort_by_sam(&mut selected);

        let summary = InsightsSummary::from_insights(&selected);
        let page = paginate(&selected, filters.page, filters.per_page)?;
        let status = if selected.is_empty() {
            DataStatus::NoData
        } else {
            DataStatus::Ready
        };

        debug!(
            locations = locations.len(),
            selected = selected.len(),
            warnings = warnings.len(),
            "insights computed"
        );

        Ok(InsightsReport {
            status,
            summary,
            page,
            warnings,
        })
    }

    /// Yearly divorce-rate averages for `state` (name or code) against the nation.
    pub async fn divorce_series(
        &self,
        state: Option<&str>,
    ) -> Result<SeriesReport<DivorceRatePoint>, InsightsError> {
        let code = match state.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => {
                Some(state_code(value).ok_or_else(|| InsightsError::UnknownState(value.to_string()))?)
            }
            None => None,
        };

        let rates = match self.provider.divorce_rates().await {
            Ok(rates) => rates,
            Err(err) => {
                warn!(error = %err, "divorce rate fetch failed");
                return Ok(SeriesReport::unavailable(err.to_string()));
            }
        };

        let points = series::divorce_rate_series(&rates, code);
        let selection_missing = code.is_some()
            && points
                .iter()
                .all(|point| point.average_rate_selection.is_none());
        if selection_missing {
            info!(state = ?code, "no divorce rates for state");
            return Ok(SeriesReport::from_points(Vec::new(), Vec::new()));
        }

        Ok(SeriesReport::from_points(points, Vec::new()))
    }

    /// Household totals per income bracket for the state/city selection.
    pub async fn income_distribution(
        &self,
        query: LocationQuery,
    ) -> Result<SeriesReport<IncomeBracketPoint>, InsightsError> {
        let rows = match self.provider.income_brackets(query).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(error = %err, "income bracket fetch failed");
                return Ok(SeriesReport::unavailable(err.to_string()));
            }
        };

        let (points, warnings) = series::income_distribution(&rows);
        Ok(SeriesReport::from_points(points, warnings))
    }
}

fn empty_report(status: DataStatus, filters: &InsightFilters) -> InsightsReport {
    let mut page = Page::empty(filters.per_page);
    page.page = filters.page;
    InsightsReport {
        status,
        summary: InsightsSummary::from_insights(&[]),
        page,
        warnings: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::domain::Tier;
    use crate::reference::CsvReferenceStore;
    use std::io::Cursor;

    fn service() -> InsightsService<CsvReferenceStore> {
        let mut builder = CsvReferenceStore::builder();
        builder
            .locations(Cursor::new(
                "zip,city,state,population,urbanicity\n\
33101,Miami,Florida,10000,Urban\n\
33102,Miami,Florida,5000,Urban\n",
            ))
            .expect("locations")
            .scores(ScoreDimension::Divorce, Cursor::new("zip,score\n33101,5\n"))
            .expect("divorce")
            .scores(
                ScoreDimension::Income,
                Cursor::new("zip,score\n33101,3\n33102,10\n"),
            )
            .expect("income")
            .divorce_rates(Cursor::new("state,year,rate\nFL,2020,3.0\nTX,2020,2.0\n"))
            .expect("rates");
        InsightsService::new(Arc::new(builder.build()), 7)
    }

    #[tokio::test]
    async fn query_scores_and_ranks_locations() {
        let service = service();
        let report = service
            .query(&service.default_filters())
            .await
            .expect("report");

        assert_eq!(report.status, DataStatus::Ready);
        assert_eq!(report.page.items.len(), 2);
        assert!(report
            .page
            .items
            .iter()
            .all(|insight| insight.tier == Some(Tier::Medium)));
        assert_eq!(report.summary.total_tam, 400_000 + 200_000);
    }

    #[tokio::test]
    async fn unmatched_filter_reports_no_data() {
        let service = service();
        let filters = InsightFilters::new(
            LocationQuery::new(Some("Texas".to_string()), None),
            service.default_page_size(),
        );
        let report = service.query(&filters).await.expect("report");

        assert_eq!(report.status, DataStatus::NoData);
        assert!(report.page.items.is_empty());
        assert_eq!(report.summary.locations, 0);
    }

    #[tokio::test]
    async fn zero_page_is_rejected() {
        let service = service();
        let filters = service.default_filters().with_page(0);
        let error = service.query(&filters).await.expect_err("invalid page");
        assert_eq!(error, InsightsError::Page(PageError::ZeroPage));
    }

    #[tokio::test]
    async fn divorce_series_flags_states_without_rows() {
        let service = service();
        let florida = service.divorce_series(Some("Florida")).await.expect("series");
        assert_eq!(florida.status, DataStatus::Ready);
        assert_eq!(florida.points[0].average_rate_national, 2.5);

        let ohio = service.divorce_series(Some("OH")).await.expect("series");
        assert_eq!(ohio.status, DataStatus::NoData);
        assert!(ohio.points.is_empty());

        let error = service
            .divorce_series(Some("Atlantis"))
            .await
            .expect_err("unknown state");
        assert_eq!(error, InsightsError::UnknownState("Atlantis".to_string()));
    }
}

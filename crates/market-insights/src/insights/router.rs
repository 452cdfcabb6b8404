use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::filter::TierSelection;
use super::report::{InsightsReport, SeriesReport};
use super::series::{DivorceRatePoint, IncomeBracketPoint};
use super::service::{InsightFilters, InsightsService};
use crate::error::AppError;
use crate::reference::{LocationQuery, ReferenceDataProvider};

#[derive(Debug, Default, Deserialize)]
pub struct InsightsQueryRequest {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    /// Tier names (`low`, `medium`, `high`) or `all`.
    #[serde(default)]
    pub tiers: Vec<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub per_page: Option<usize>,
}

impl InsightsQueryRequest {
    pub fn into_filters(self, default_per_page: usize) -> Result<InsightFilters, AppError> {
        let tiers = TierSelection::from_names(&self.tiers)
            .map_err(|err| AppError::Insights(err.into()))?;
        let filters = InsightFilters::new(
            LocationQuery::new(self.state, self.city),
            self.per_page.unwrap_or(default_per_page),
        )
        .with_tiers(tiers)
        .with_page(self.page.unwrap_or(1));
        Ok(filters)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DivorceSeriesRequest {
    #[serde(default)]
    pub state: Option<String>,
}

/// Response envelope stamping when a widget's data was computed.
#[derive(Debug, Serialize)]
pub struct Stamped<T> {
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Stamped<T> {
    fn now(body: T) -> Json<Self> {
        Json(Self {
            generated_at: Utc::now(),
            body,
        })
    }
}

/// Router builder exposing the opportunity table and chart series.
pub fn insights_router<P>(service: Arc<InsightsService<P>>) -> Router
where
    P: ReferenceDataProvider + 'static,
{
    Router::new()
        .route("/api/v1/insights/query", post(query_handler::<P>))
        .route(
            "/api/v1/insights/divorce-series",
            post(divorce_series_handler::<P>),
        )
        .route(
            "/api/v1/insights/income-distribution",
            post(income_distribution_handler::<P>),
        )
        .with_state(service)
}

pub(crate) async fn query_handler<P>(
    State(service): State<Arc<InsightsService<P>>>,
    Json(request): Json<InsightsQueryRequest>,
) -> Result<Json<Stamped<InsightsReport>>, AppError>
where
    P: ReferenceDataProvider + 'static,
{
    let filters = request.into_filters(service.default_page_size())?;
    let report = service.query(&filters).await?;
    Ok(Stamped::now(report))
}

pub(crate) async fn divorce_series_handler<P>(
    State(service): State<Arc<InsightsService<P>>>,
    Json(request): Json<DivorceSeriesRequest>,
) -> Result<Json<Stamped<SeriesReport<DivorceRatePoint>>>, AppError>
where
    P: ReferenceDataProvider + 'static,
{
    let series = service.divorce_series(request.state.as_deref()).await?;
    Ok(Stamped::now(series))
}

pub(crate) async fn income_distribution_handler<P>(
    State(service): State<Arc<InsightsService<P>>>,
    Json(query): Json<LocationQuery>,
) -> Result<Json<Stamped<SeriesReport<IncomeBracketPoint>>>, AppError>
where
    P: ReferenceDataProvider + 'static,
{
    let query = LocationQuery::new(query.state, query.city);
    let series = service.income_distribution(query).await?;
    Ok(Stamped::now(series))
}

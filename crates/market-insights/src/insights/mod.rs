//! Composite scoring, market sizing and ranking of location opportunities.

pub mod aggregate;
pub mod domain;
pub mod filter;
pub mod market;
pub mod report;
pub mod router;
pub mod series;
pub mod service;
pub mod session;

pub use aggregate::{aggregate, join_scores, AggregateOutcome, ScoreLookup, ScoredLocation};
pub use domain::{
    CompositeInsight, DivorceRateRecord, IncomeBracketRecord, LocationRecord, MarketSize,
    ScoreDimension, ScoreRecord, Tier, Urbanicity,
};
pub use filter::{filter_by_tier, paginate, sort_by_sam, Page, PageError, TierSelection};
pub use market::{estimate, MarketSizeError};
pub use report::{DataStatus, InsightsReport, InsightsSummary, PipelineWarning, SeriesReport};
pub use router::insights_router;
pub use series::{DivorceRatePoint, IncomeBracketPoint};
pub use service::{InsightFilters, InsightsError, InsightsService};
pub use session::{InsightsSession, RequestTicket, SessionOutcome};

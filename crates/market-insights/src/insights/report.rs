use super::domain::{CompositeInsight, ScoreDimension, Tier};
use super::filter::Page;
use serde::Serialize;

/// Non-fatal problems met while building a report. Each widget surfaces its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineWarning {
    DimensionUnavailable {
        dimension: ScoreDimension,
        reason: String,
    },
    RowSkipped {
        zip: String,
        reason: String,
    },
}

impl PipelineWarning {
    pub fn message(&self) -> String {
        match self {
            Self::DimensionUnavailable { dimension, reason } => {
                format!("{dimension} scores unavailable, defaulted to 0 ({reason})")
            }
            Self::RowSkipped { zip, reason } => format!("skipped {zip}: {reason}"),
        }
    }
}

/// Whether the widget has real data to draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DataStatus {
    Ready,
    /// The filter matched nothing. Never replaced with sample data.
    NoData,
    Unavailable { reason: String },
}

impl DataStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::NoData => "No data for this filter",
            Self::Unavailable { .. } => "Unavailable",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TierCount {
    pub tier: Tier,
    pub tier_label: &'static str,
    pub locations: usize,
}

/// Totals over the filtered (pre-pagination) result set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InsightsSummary {
    pub locations: usize,
    pub unscored: usize,
    pub tier_counts: Vec<TierCount>,
    pub total_households: u64,
    pub total_tam: u64,
    pub total_sam: u64,
}

impl InsightsSummary {
    pub fn from_insights(insights: &[CompositeInsight]) -> Self {
        let tier_counts = Tier::ordered()
            .into_iter()
            .map(|tier| TierCount {
                tier,
                tier_label: tier.label(),
                locations: insights
                    .iter()
                    .filter(|insight| insight.tier == Some(tier))
                    .count(),
            })
            .collect();

        Self {
            locations: insights.len(),
            unscored: insights.iter().filter(|insight| insight.tier.is_none()).count(),
            tier_counts,
            total_households: insights
                .iter()
                .map(|insight| insight.households)
                .fold(0, u64::saturating_add),
            total_tam: insights
                .iter()
                .map(|insight| insight.tam)
                .fold(0, u64::saturating_add),
            total_sam: insights
                .iter()
                .map(|insight| insight.sam)
                .fold(0, u64::saturating_add),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InsightsReport {
    pub status: DataStatus,
    pub summary: InsightsSummary,
    pub page: Page<CompositeInsight>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<PipelineWarning>,
}

/// Result envelope for the auxiliary chart series.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesReport<T> {
    pub status: DataStatus,
    pub points: Vec<T>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<PipelineWarning>,
}

impl<T> SeriesReport<T> {
    pub(crate) fn from_points(points: Vec<T>, warnings: Vec<PipelineWarning>) -> Self {
        let status = if points.is_empty() {
            DataStatus::NoData
        } else {
            DataStatus::Ready
        };
        Self {
            status,
            points,
            warnings,
        }
    }

    pub(crate) fn unavailable(reason: String) -> Self {
        Self {
            status: DataStatus::Unavailable { reason },
            points: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

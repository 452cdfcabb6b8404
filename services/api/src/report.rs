use crate::infra::load_service;
use clap::Args;
use market_insights::config::AppConfig;
use market_insights::error::AppError;
use market_insights::insights::{
    DataStatus, DivorceRatePoint, IncomeBracketPoint, InsightFilters, InsightsReport,
    PipelineWarning, SeriesReport, TierSelection,
};
use market_insights::reference::LocationQuery;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct QueryArgs {
    /// State name or two-letter code
    #[arg(long)]
    pub(crate) state: Option<String>,
    /// Partial city name
    #[arg(long)]
    pub(crate) city: Option<String>,
    /// Comma-separated tiers to keep (low, medium, high or all)
    #[arg(long, value_delimiter = ',')]
    pub(crate) tiers: Vec<String>,
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub(crate) page: usize,
    /// Rows per page (defaults to APP_PAGE_SIZE)
    #[arg(long)]
    pub(crate) per_page: Option<usize>,
    /// Reference data directory (defaults to APP_DATA_DIR)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Print the report as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct SeriesArgs {
    /// State name or two-letter code; omit for the national series only
    #[arg(long)]
    pub(crate) state: Option<String>,
    /// Reference data directory (defaults to APP_DATA_DIR)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct IncomeArgs {
    /// State name or two-letter code
    #[arg(long)]
    pub(crate) state: Option<String>,
    /// Partial city name
    #[arg(long)]
    pub(crate) city: Option<String>,
    /// Reference data directory (defaults to APP_DATA_DIR)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

pub(crate) async fn run_query(args: QueryArgs) -> Result<(), AppError> {
    let QueryArgs {
        state,
        city,
        tiers,
        page,
        per_page,
        data_dir,
        json,
    } = args;

    let config = AppConfig::load()?;
    let service = load_service(&config, data_dir)?;

    let tiers = TierSelection::from_names(&tiers).map_err(|err| AppError::Insights(err.into()))?;
    let filters = InsightFilters::new(
        LocationQuery::new(state, city),
        per_page.unwrap_or(service.default_page_size()),
    )
    .with_tiers(tiers)
    .with_page(page);

    let report = service.query(&filters).await?;
    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(body) => println!("{body}"),
            Err(err) => println!("Report payload unavailable: {err}"),
        }
    } else {
        render_insights_report(&filters, &report);
    }

    Ok(())
}

pub(crate) async fn run_divorce_series(args: SeriesArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = load_service(&config, args.data_dir)?;
    let series = service.divorce_series(args.state.as_deref()).await?;
    render_divorce_series(args.state.as_deref(), &series);
    Ok(())
}

pub(crate) async fn run_income_distribution(args: IncomeArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = load_service(&config, args.data_dir)?;
    let series = service
        .income_distribution(LocationQuery::new(args.state, args.city))
        .await?;
    render_income_distribution(&series);
    Ok(())
}

fn describe_selection(query: &LocationQuery) -> String {
    match (&query.state, &query.city) {
        (None, None) => "all locations".to_string(),
        (Some(state), None) => state.clone(),
        (None, Some(city)) => format!("cities matching '{city}'"),
        (Some(state), Some(city)) => format!("{state}, cities matching '{city}'"),
    }
}

fn render_status(status: &DataStatus) -> bool {
    match status {
        DataStatus::Ready => true,
        DataStatus::NoData => {
            println!("{}", status.label());
            false
        }
        DataStatus::Unavailable { reason } => {
            println!("{}: {}", status.label(), reason);
            false
        }
    }
}

fn render_warnings(warnings: &[PipelineWarning]) {
    if warnings.is_empty() {
        return;
    }
    println!("\nWarnings");
    for warning in warnings {
        println!("- {}", warning.message());
    }
}

pub(crate) fn render_insights_report(filters: &InsightFilters, report: &InsightsReport) {
    println!("Market opportunity report");
    println!("Selection: {}", describe_selection(&filters.location));

    if !render_status(&report.status) {
        render_warnings(&report.warnings);
        return;
    }

    let summary = &report.summary;
    println!(
        "{} locations | {} households | TAM {} | SAM {}",
        summary.locations, summary.total_households, summary.total_tam, summary.total_sam
    );
    for count in &summary.tier_counts {
        println!("- {}: {}", count.tier_label, count.locations);
    }
    if summary.unscored > 0 {
        println!("- Outside tier range: {}", summary.unscored);
    }

    let page = &report.page;
    println!(
        "\nPage {}/{} ({} per page)",
        page.page,
        page.total_pages.max(1),
        page.per_page
    );
    if page.items.is_empty() {
        println!("No rows on this page");
    }
    for insight in &page.items {
        let tier = insight.tier.map(|tier| tier.label()).unwrap_or("-");
        let competitors = insight
            .competitor_count
            .map(|count| count.to_string())
            .unwrap_or_else(|| "?".to_string());
        println!(
            "- {} {}, {} | {} | score {} ({}) | households {} | TAM {} | SAM {} | competitors {}",
            insight.zip,
            insight.city,
            insight.state,
            insight.urbanicity.label(),
            insight.composite_score,
            tier,
            insight.households,
            insight.tam,
            insight.sam,
            competitors
        );
    }

    render_warnings(&report.warnings);
}

pub(crate) fn render_divorce_series(state: Option<&str>, series: &SeriesReport<DivorceRatePoint>) {
    println!("Divorce rate by year");
    println!("Selection: {}", state.unwrap_or("national"));

    if !render_status(&series.status) {
        return;
    }

    for point in &series.points {
        let selection = point
            .average_rate_selection
            .map(|rate| format!("{rate:.2}"))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "- {}: selection {} | national {:.2}",
            point.year, selection, point.average_rate_national
        );
    }
    render_warnings(&series.warnings);
}

pub(crate) fn render_income_distribution(series: &SeriesReport<IncomeBracketPoint>) {
    println!("Households by income bracket");

    if !render_status(&series.status) {
        render_warnings(&series.warnings);
        return;
    }

    for point in &series.points {
        println!("- {}: {}", point.bracket, point.total_households);
    }
    render_warnings(&series.warnings);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_descriptions_cover_each_filter_shape() {
        assert_eq!(describe_selection(&LocationQuery::default()), "all locations");
        assert_eq!(
            describe_selection(&LocationQuery::new(
                Some("Florida".to_string()),
                Some("mia".to_string())
            )),
            "Florida, cities matching 'mia'"
        );
    }

    #[test]
    fn only_ready_status_renders_rows() {
        assert!(render_status(&DataStatus::Ready));
        assert!(!render_status(&DataStatus::NoData));
        assert!(!render_status(&DataStatus::Unavailable {
            reason: "offline".to_string()
        }));
    }
}

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use market_insights::insights::{DataStatus, InsightFilters, InsightsService, Tier};
use market_insights::reference::{CsvReferenceStore, LocationQuery, ProviderError};

fn sample_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

fn sample_service() -> InsightsService<CsvReferenceStore> {
    let store = CsvReferenceStore::from_dir(sample_data_dir()).expect("sample data loads");
    InsightsService::new(Arc::new(store), 7)
}

#[test]
fn sample_exports_load_without_skipped_rows() {
    let store = CsvReferenceStore::from_dir(sample_data_dir()).expect("sample data loads");
    assert_eq!(store.location_count(), 10);
    assert!(store.skipped_rows().is_empty(), "{:?}", store.skipped_rows());
}

#[tokio::test]
async fn florida_opportunities_rank_by_serviceable_market() {
    let service = sample_service();
    let filters = InsightFilters::new(LocationQuery::new(Some("Florida".to_string()), None), 7);
    let report = service.query(&filters).await.expect("report");

    assert_eq!(report.status, DataStatus::Ready);
    let zips: Vec<&str> = report.page.items.iter().map(|item| item.zip.as_str()).collect();
    assert_eq!(zips, vec!["33301", "33101", "33125", "32801", "32034"]);

    let top = &report.page.items[0];
    assert_eq!(top.composite_score, 16.0);
    assert_eq!(top.tier, Some(Tier::High));
    assert_eq!(top.households, 7_192);
    assert_eq!(top.sam, 719_200);
    assert_eq!(top.competitor_count, Some(3));

    assert_eq!(report.summary.total_sam, 719_200 + 496_000);
}

#[tokio::test]
async fn non_numeric_scores_count_as_zero() {
    let service = sample_service();
    let filters = InsightFilters::new(LocationQuery::new(Some("PR".to_string()), None), 7);
    let report = service.query(&filters).await.expect("report");

    let san_juan = &report.page.items[0];
    assert_eq!(san_juan.income_score, 0.0);
    assert_eq!(san_juan.composite_score, 10.0);
    assert_eq!(san_juan.tier, Some(Tier::Medium));
}

#[tokio::test]
async fn divorce_series_compares_state_with_nation() {
    let service = sample_service();
    let series = service
        .divorce_series(Some("Florida"))
        .await
        .expect("series");

    assert_eq!(series.status, DataStatus::Ready);
    let years: Vec<i32> = series.points.iter().map(|point| point.year).collect();
    assert_eq!(years, vec![2019, 2020, 2021]);
    assert_eq!(series.points[1].average_rate_selection, Some(3.3));
    assert!(series.points[1].average_rate_national < 3.3);
}

#[tokio::test]
async fn income_distribution_orders_brackets_numerically() {
    let service = sample_service();
    let series = service
        .income_distribution(LocationQuery::new(
            Some("Florida".to_string()),
            Some("miami".to_string()),
        ))
        .await
        .expect("series");

    assert_eq!(series.points.len(), 10);
    assert_eq!(series.points[0].bracket_floor, 0);
    assert_eq!(series.points[0].total_households, 4_120);
    assert_eq!(series.points[9].bracket_floor, 200_000);
    assert!(series
        .points
        .windows(2)
        .all(|pair| pair[0].bracket_floor < pair[1].bracket_floor));
}

#[tokio::test]
async fn missing_series_exports_load_as_no_data() {
    let dir = std::env::temp_dir().join(format!("market-insights-import-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("temp dir");
    fs::write(
        dir.join("locations.csv"),
        "zip,city,state,population,urbanicity\n84101,Salt Lake City,Utah,9000,Urban\n",
    )
    .expect("write locations");
    fs::write(dir.join("divorce_scores.csv"), "zip,score\n84101,7\n").expect("write divorce");
    fs::write(dir.join("income_scores.csv"), "zip,score\n84101,8\n").expect("write income");

    let store = CsvReferenceStore::from_dir(&dir).expect("store loads");
    let service = InsightsService::new(Arc::new(store), 7);

    let series = service.divorce_series(None).await.expect("series");
    assert_eq!(series.status, DataStatus::NoData);

    let report = service
        .query(&service.default_filters())
        .await
        .expect("report");
    assert_eq!(report.page.items[0].tier, Some(Tier::High));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_location_export_is_an_io_error() {
    let dir = std::env::temp_dir().join(format!("market-insights-empty-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("temp dir");

    let error = CsvReferenceStore::from_dir(&dir).expect_err("locations required");
    assert!(matches!(error, ProviderError::Io(_)));

    fs::remove_dir_all(&dir).ok();
}

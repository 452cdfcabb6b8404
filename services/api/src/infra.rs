use market_insights::config::AppConfig;
use market_insights::error::AppError;
use market_insights::insights::InsightsService;
use market_insights::reference::CsvReferenceStore;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type CsvInsightsService = InsightsService<CsvReferenceStore>;

/// Load the CSV snapshot and wrap it in a service. `data_dir` overrides the config.
pub(crate) fn load_service(
    config: &AppConfig,
    data_dir: Option<PathBuf>,
) -> Result<Arc<CsvInsightsService>, AppError> {
    let data_dir = data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let store = CsvReferenceStore::from_dir(&data_dir)?;
    info!(
        data_dir = %data_dir.display(),
        locations = store.location_count(),
        skipped_rows = store.skipped_rows().len(),
        "reference snapshot ready"
    );
    Ok(Arc::new(InsightsService::new(
        Arc::new(store),
        config.data.page_size,
    )))
}

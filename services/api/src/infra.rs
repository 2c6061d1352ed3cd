use metrics_exporter_prometheus::PrometheusHandle;
use seismic_risk::config::ScoringConfig;
use seismic_risk::error::AppError;
use seismic_risk::router::RiskService;
use seismic_risk::scoring::RiskEngine;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Builds the shared scoring service from the configured catalog and defaults.
pub(crate) fn risk_service(config: &ScoringConfig) -> Result<RiskService, AppError> {
    let catalog = config.load_catalog()?;
    Ok(RiskService::new(
        RiskEngine::new(catalog),
        config.run_options(),
    ))
}

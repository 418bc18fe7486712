use metrics_exporter_prometheus::PrometheusHandle;
use price_estimator::config::AppConfig;
use price_estimator::pricing::{ModelResolver, PricingService, ResolveError};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::cli::ModelArgs;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) model: ModelStatus,
}

/// Read-only description of the serving model for health checks.
#[derive(Debug, Clone)]
pub(crate) struct ModelStatus {
    pub(crate) model_path: PathBuf,
    pub(crate) model_name: String,
    pub(crate) ml_used: bool,
}

impl ModelStatus {
    pub(crate) fn describe(path: &Path, service: &PricingService) -> Self {
        Self {
            model_path: path.to_path_buf(),
            model_name: service.model().name().to_string(),
            ml_used: service.provenance().ml_used,
        }
    }
}

/// Apply the CLI override and resolve the serving model once.
///
/// The fallback cause, if any, is returned for callers that report it to a terminal.
pub(crate) fn resolve_pricing(
    config: &mut AppConfig,
    args: &ModelArgs,
) -> (PricingService, Option<ResolveError>) {
    if let Some(path) = args.model_path.clone() {
        config.model.artifact_path = path;
    }
    let resolution = ModelResolver::new(&config.model.artifact_path).resolve_with_cause();
    (
        PricingService::new(resolution.model),
        resolution.fallback_cause,
    )
}

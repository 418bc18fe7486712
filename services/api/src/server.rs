use crate::cli::ServeArgs;
use crate::infra::{resolve_pricing, AppState, ModelStatus};
use crate::routes::with_pricing_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use price_estimator::config::AppConfig;
use price_estimator::error::AppError;
use price_estimator::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (pricing, _) = resolve_pricing(&mut config, &args.model);
    let model = ModelStatus::describe(&config.model.artifact_path, &pricing);

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        model,
    };

    let app = with_pricing_routes(Arc::new(pricing))
        .layer(Extension(app_state.clone()))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        model = %app_state.model.model_name,
        ml_used = app_state.model.ml_used,
        "price estimation service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

use crate::cli::ServeArgs;
use crate::infra::{AppState, GeoProvider, Workflows};
use crate::routes::with_insurance_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use insurance_agent::config::AppConfig;
use insurance_agent::error::AppError;
use insurance_agent::telemetry;
use insurance_agent::workflows::premium::PremiumService;
use std::sync::atomic::Ordering;
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

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let locations = Arc::new(GeoProvider::from_config(&config.geo)?);
    let premium_service = Arc::new(PremiumService::new(locations));
    let workflows = Workflows::from_config(&config)?;

    let app = with_insurance_routes(premium_service, workflows)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "smart insurance agent ready");

    axum::serve(listener, app).await?;
    Ok(())
}

use crate::cli::ServeArgs;
use crate::infra::{AppState, ServiceGraph};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};
use wastewatch::config::AppConfig;
use wastewatch::error::AppError;
use wastewatch::telemetry;

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

    let services = ServiceGraph::from_config(&config);
    if config.data.seed_sample_data {
        info!("seeded in-memory store with sample reports and workers");
    }
    if config.data.allow_admin_signup && config.environment.is_production() {
        warn!("admin self-registration is enabled in production");
    }

    let app = with_service_routes(&services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        session_ttl_minutes = config.sessions.ttl_minutes,
        "waste report service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

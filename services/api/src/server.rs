use crate::cli::ServeArgs;
use crate::infra::{seeded_store, AdjudicatorBackend, AppState};
use crate::routes::with_audit_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use enroll_ai::config::AppConfig;
use enroll_ai::error::AppError;
use enroll_ai::telemetry;
use enroll_ai::workflows::audit::{AuditRunError, AuditService};
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

    let store = Arc::new(seeded_store(Local::now().date_naive()));
    let backend = AdjudicatorBackend::from_config(&config.adjudicator)
        .map_err(|err| AppError::Audit(AuditRunError::from(err)))?;
    info!(backend = backend.label(), "adjudication backend selected");

    let audit_service = Arc::new(AuditService::new(
        store.clone(),
        store,
        Arc::new(backend),
    ));

    let app = with_audit_routes(audit_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "enrollment audit orchestrator ready");

    axum::serve(listener, app).await?;
    Ok(())
}

use crate::cli::ServeArgs;
use crate::infra::{build_profile, open_store, AppState, LogNotifier};
use crate::routes::with_dispatch_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use deskroute::config::AppConfig;
use deskroute::dispatch::DispatchService;
use deskroute::error::AppError;
use deskroute::telemetry;
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

    let profile = Arc::new(build_profile(&config.dispatch)?);
    let store = Arc::new(open_store(&config.dispatch)?);
    let dispatch_service = Arc::new(DispatchService::with_settings(
        profile,
        store,
        Arc::new(LogNotifier),
        config.dispatch.settings(),
    ));

    let app = with_dispatch_routes(dispatch_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        store = %config.dispatch.store_path.display(),
        notifications = config.dispatch.notifications_enabled,
        "request router ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

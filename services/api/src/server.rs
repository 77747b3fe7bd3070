use crate::cli::ServeArgs;
use crate::infra::{sample_data, AppState};
use crate::routes::with_application_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use jobboard::config::AppConfig;
use jobboard::error::AppError;
use jobboard::telemetry;
use jobboard::workflows::profile::ProfileService;
use jobboard::workflows::screening::{RepositoryError, ScreeningService, ScreeningServiceError};
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

    let data = sample_data().map_err(seed_error)?;
    let screening = Arc::new(ScreeningService::new(
        data.applications,
        data.questions,
        config.screening.response_id_sequence(),
    ));
    let profiles = Arc::new(ProfileService::new(data.profiles));

    let app = with_application_routes(screening, profiles)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "job board screening service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

pub(crate) fn seed_error(error: RepositoryError) -> AppError {
    AppError::Screening(ScreeningServiceError::Repository(error))
}

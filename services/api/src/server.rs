use crate::cli::ServeArgs;
use crate::infra::{shutdown_signal, AppState};
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use renovia::app::{api_router, AppContext};
use renovia::config::AppConfig;
use renovia::error::AppError;
use renovia::store::Database;
use renovia::telemetry;
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

    let database = Database::connect(&config.database).await?;
    let ctx = AppContext::new(database.stores(), &config.auth, config.subsidy);
    if let Some(seed) = &config.bootstrap_admin {
        if ctx.accounts.ensure_admin(seed).await? {
            info!(email = %seed.email, "bootstrap administrator created");
        }
    }

    let grant_ratio = ctx.pdas.grant_ratio();

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_operational_routes(api_router(ctx))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        backend = database.backend(),
        grant_ratio,
        "renovia api ready"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(readiness_flag))
        .await?;

    database.shutdown().await;
    info!("renovia api stopped");
    Ok(())
}

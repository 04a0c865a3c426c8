//! Casework assessment API server entry point.

use std::sync::Arc;

use casework_api::config::AppConfig;
use casework_api::error::AppError;
use casework_api::state::AppState;
use casework_api::telemetry;
use casework_core::clock::SystemClock;
use casework_event_store::pg_event_repository::PgEventRepository;
use casework_event_store::schema;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let telemetry = telemetry::init(&config)?;

    info!(
        service = %config.service_name,
        otlp = config.otlp_endpoint.is_some(),
        "starting casework API server"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    if config.run_migrations {
        schema::run_migrations(&pool).await?;
        info!("database migrations applied");
    }

    let app_state = AppState::new(
        Arc::new(SystemClock),
        Arc::new(PgEventRepository::new(pool)),
    );

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = casework_api::router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    telemetry.shutdown();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

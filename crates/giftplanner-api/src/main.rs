//! Family gift planner API server entry point.

use std::sync::Arc;

use giftplanner_api::config::AppConfig;
use giftplanner_api::error::AppError;
use giftplanner_api::state::AppState;
use giftplanner_core::clock::SystemClock;
use giftplanner_core::event_log::EventLog;
use giftplanner_event_store::{InMemoryEventLog, PgEventLog};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting family gift planner API server");

    let config = AppConfig::from_env()?;

    let log: Arc<dyn EventLog> = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .connect(database_url)
                .await?;
            let log = PgEventLog::new(pool);
            log.ensure_schema().await?;
            tracing::info!("Using PostgreSQL event log");
            Arc::new(log)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; events are kept in memory and lost on exit");
            Arc::new(InMemoryEventLog::new())
        }
    };

    let app_state = AppState::new(log, Arc::new(SystemClock), config.supervisor_config());

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = giftplanner_api::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}

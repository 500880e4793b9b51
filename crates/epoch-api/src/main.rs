//! Epoch API server entry point.

use std::sync::Arc;

use epoch_content::catalog::EventCatalog;
use epoch_content::generators::{CatalogEventGenerator, StaticEventGenerator};
use epoch_core::clock::SystemClock;
use epoch_core::generator::EventGenerator;
use epoch_core::repository::SessionRepository;
use epoch_core::rng::StdRngSource;
use epoch_session::domain::settings::SessionDefaults;
use epoch_store::memory::InMemorySessionRepository;
use epoch_store::pg_session_repository::PgSessionRepository;
use epoch_store::schema::run_migrations;
use epoch_store::timeout::TimeoutSessionRepository;
use sqlx::postgres::PgPoolOptions;

use epoch_api::config::ApiConfig;
use epoch_api::error::AppError;
use epoch_api::state::AppState;
use epoch_api::telemetry;

async fn build_repository(config: &ApiConfig) -> Result<Arc<dyn SessionRepository>, AppError> {
    let inner: Arc<dyn SessionRepository> = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .acquire_timeout(config.store_timeout)
                .connect(database_url)
                .await?;
            run_migrations(&pool).await?;
            tracing::info!("using PostgreSQL session store");
            Arc::new(PgSessionRepository::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, sessions will not survive a restart");
            Arc::new(InMemorySessionRepository::new())
        }
    };
    Ok(Arc::new(TimeoutSessionRepository::new(
        inner,
        config.store_timeout,
    )))
}

fn build_generator(config: &ApiConfig) -> Result<Arc<dyn EventGenerator>, AppError> {
    let Some(path) = &config.event_catalog else {
        tracing::info!("using static event generator");
        return Ok(Arc::new(StaticEventGenerator));
    };
    let catalog = EventCatalog::load(path)?;
    let rng = config
        .rng_seed
        .map_or_else(StdRngSource::from_entropy, StdRngSource::seeded);
    tracing::info!(
        catalog = %path.display(),
        templates = catalog.templates.len(),
        "using catalog event generator"
    );
    Ok(Arc::new(CatalogEventGenerator::new(catalog, Box::new(rng))))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = ApiConfig::from_env()?;
    let telemetry = telemetry::init(config.otlp_endpoint.as_deref())?;

    tracing::info!("Starting Epoch API server");

    let repository = build_repository(&config).await?;
    let generator = build_generator(&config)?;
    let session_defaults = SessionDefaults {
        initial_year: config.initial_year,
        ..SessionDefaults::default()
    };
    let app_state = AppState::new(
        repository,
        generator,
        Arc::new(SystemClock),
        config.decision_policy,
        session_defaults,
    );

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!("Listening on {}", config.addr);

    axum::serve(listener, epoch_api::app(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    telemetry.shutdown()
}

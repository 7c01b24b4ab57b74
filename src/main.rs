//! SignalShield webhook server.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use signal_shield::adapters::http::app_router;
use signal_shield::adapters::{InMemorySessionStore, PostgresReportSink, RetryingReportSink};
use signal_shield::application::{spawn_idle_eviction, IntakeService};
use signal_shield::config::AppConfig;
use signal_shield::domain::intake::{CategoryRegistry, ConversationEngine};
use signal_shield::ports::SessionStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.server.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    config.validate()?;

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let registry = Arc::new(CategoryRegistry::standard()?);
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new(
        config.intake.shard_count,
        config.intake.deliveries_per_conversation,
    ));
    let sink = RetryingReportSink::new(
        PostgresReportSink::new(pool),
        config.persistence.retry_policy(),
    );
    let intake = Arc::new(IntakeService::new(
        store.clone(),
        ConversationEngine::new(registry),
        Arc::new(sink),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = spawn_idle_eviction(
        store,
        config.intake.session_idle_ttl(),
        config.intake.eviction_interval(),
        shutdown_rx,
    );

    let app = app_router(intake, config.server.request_timeout());
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "SignalShield listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    let _ = shutdown_tx.send(true);
    let _ = sweeper.await;

    Ok(())
}

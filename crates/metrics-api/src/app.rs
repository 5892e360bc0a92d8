//! Application setup: database pool, shared state, router assembly.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use metrics_dispatcher::Dispatcher;
use metrics_provider::{HttpProviderAdapter, ProviderAdapter};
use metrics_store::{CatalogStore, PgCatalogStore};
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing::info;

use metrics_config::Settings;

use crate::routes;

/// State shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub store: Arc<dyn CatalogStore>,
    pub dispatcher: Arc<Dispatcher>,
    pub provider: Arc<dyn ProviderAdapter>,
}

/// Build the Axum application: connect the database, migrate, wire the
/// store/dispatcher/provider, mount every job route plus `/healthz`.
pub async fn create_app(settings: &Settings) -> Result<Router> {
    let db = create_db_pool(settings).await?;

    info!("running database migrations");
    sqlx::migrate!("../metrics-store/migrations")
        .run(&db)
        .await
        .context("failed to run database migrations")?;
    info!("migrations complete");

    let store: Arc<dyn CatalogStore> = Arc::new(PgCatalogStore::new(db.clone()));
    let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&store)));
    let provider: Arc<dyn ProviderAdapter> = Arc::new(HttpProviderAdapter::new());

    let state = AppState {
        db,
        store,
        dispatcher,
        provider,
    };

    let app = Router::new()
        .merge(routes::jobs::router())
        .merge(routes::health::router())
        .with_state(state)
        .layer(
            tower::ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new()),
        );

    Ok(app)
}

async fn create_db_pool(settings: &Settings) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.database.max_connections)
        .min_connections(settings.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .connect(settings.database.url.expose_secret())
        .await
        .context("failed to connect to database")?;

    info!(
        "database pool created (max: {}, min: {})",
        settings.database.max_connections, settings.database.min_connections
    );

    Ok(pool)
}

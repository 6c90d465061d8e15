//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, MemoryStore},
    config::Config,
    error::ApiError,
    seed::{load_seed_file, seed_thoughts},
    web::{self, rest::ApiDoc, state::AppState},
};
use happy_thoughts_core::ports::{AuthProvider, ThoughtRepository};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Open Storage & Run Migrations ---
    let (repo, auth, db_adapter): (
        Arc<dyn ThoughtRepository>,
        Arc<dyn AuthProvider>,
        Option<Arc<DbAdapter>>,
    ) = match &config.database_url {
        Some(database_url) => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(database_url)
                .await?;
            let db_adapter = Arc::new(DbAdapter::new(db_pool));
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            let repo: Arc<dyn ThoughtRepository> = db_adapter.clone();
            let auth: Arc<dyn AuthProvider> = db_adapter.clone();
            (repo, auth, Some(db_adapter))
        }
        None => {
            warn!("DATABASE_URL is not set; thoughts and accounts are kept in memory only");
            let store = Arc::new(MemoryStore::new());
            let repo: Arc<dyn ThoughtRepository> = store.clone();
            let auth: Arc<dyn AuthProvider> = store;
            (repo, auth, None)
        }
    };

    // --- 3. Seed Thoughts ---
    if let Some(seed_path) = &config.seed_path {
        info!("Seeding thoughts from {}", seed_path.display());
        let seeds = load_seed_file(seed_path).await?;
        seed_thoughts(repo.as_ref(), seeds, config.reset_database).await?;
    }

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(repo, auth, config.clone()));

    // --- 5. Create the Web Router ---
    // Merge the API router with the Swagger UI router for a complete application.
    let app = web::app(app_state)?
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // --- 7. Release Storage ---
    if let Some(db_adapter) = db_adapter {
        info!("Closing database connections...");
        db_adapter.close().await;
    }
    info!("Server stopped.");

    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received, draining connections...");
}

//! HTTP server initialization and runtime setup.
//!
//! Handles the share link store, the upstream client, and the Axum server
//! lifecycle.

use crate::config::Config;
use crate::domain::repositories::ShareLinkRepository;
use crate::infrastructure::persistence::{InMemoryShareLinkRepository, PgShareLinkRepository};
use crate::infrastructure::upstream::HttpResultsSource;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Opens the PostgreSQL pool with the configured limits and applies
/// embedded migrations.
///
/// # Errors
///
/// Returns an error if the connection or a migration fails.
pub async fn connect_database(config: &Config, database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to apply migrations")?;

    Ok(pool)
}

/// Builds the share link store selected by the configuration.
///
/// # Errors
///
/// Returns an error if PostgreSQL is configured but unreachable.
pub async fn build_repository(config: &Config) -> Result<Arc<dyn ShareLinkRepository>> {
    match &config.database_url {
        Some(database_url) => {
            let pool = connect_database(config, database_url).await?;
            tracing::info!("Share link store: PostgreSQL");
            Ok(Arc::new(PgShareLinkRepository::new(Arc::new(pool))))
        }
        None => {
            tracing::warn!(
                "Share link store: in-memory. Links are lost on restart and not shared between instances; set DATABASE_URL for production"
            );
            Ok(Arc::new(InMemoryShareLinkRepository::new()))
        }
    }
}

/// Wires services from the configuration.
///
/// # Errors
///
/// Returns an error if the store or the upstream client cannot be set up.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let repository = build_repository(config).await?;

    let source = HttpResultsSource::new(config.upstream_url()?, config.upstream_timeout())
        .context("Failed to build upstream HTTP client")?;

    let state = AppState::new(
        repository,
        Arc::new(source),
        config.gateway_settings(),
        config.report_settings(),
    );

    let strategies = state.gateway.fallback_strategies();
    if strategies.is_empty() {
        tracing::error!(
            needs_configuration = true,
            "No upstream credential for public viewers; shared reports will answer 503 until SYSTEM_API_TOKEN, PUBLIC_API_TOKEN or UPSTREAM_ALLOW_ANONYMOUS is set"
        );
    } else {
        tracing::info!(strategies = ?strategies, "Upstream fallback strategies configured");
    }

    Ok(state)
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Share link store (PostgreSQL with migrations, or in-memory)
/// - Upstream HTTP client
/// - Axum HTTP server with graceful shutdown on Ctrl+C
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let state = build_state(&config).await?;

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

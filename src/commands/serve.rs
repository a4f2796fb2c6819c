//! Serve command - Starts the HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use apalis_sql::postgres::PostgresStorage;

use super::connect_job_pool;
use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Cache, Database};
use crate::jobs::PaymentExpiryQueue;

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    let db = Database::connect(&config).await?;
    if args.skip_migrations {
        tracing::warn!("Skipping migrations on startup");
    } else {
        db.run_migrations().await?;
        tracing::info!("Migrations applied");
    }

    let cache = Cache::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Redis connection failed: {}", e)))?;

    // Expiry jobs are consumed by `jobs work`
    let pool = connect_job_pool(&config).await?;
    let queue = PaymentExpiryQueue::new(PostgresStorage::new(pool));

    let app_state = AppState::from_config(
        Arc::new(db),
        Arc::new(cache),
        Arc::new(queue),
        config.clone(),
    );
    let app = create_router(app_state, &config);

    let host = args.host.unwrap_or_else(|| config.server_host.clone());
    let port = args.port.unwrap_or(config.server_port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Received shutdown signal");
}

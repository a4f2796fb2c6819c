//! Commands module - CLI command implementations.
//!
//! Each command is implemented in its own module for separation of concerns.

pub mod admin;
pub mod jobs;
pub mod migrate;
pub mod serve;

use apalis_sql::postgres::PostgresStorage;
use apalis_sql::sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::Config;
use crate::errors::{AppError, AppResult};

/// Connect the job pool and make sure the apalis tables exist
pub(crate) async fn connect_job_pool(config: &Config) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .map_err(|e| AppError::internal(format!("Failed to connect job pool: {}", e)))?;

    PostgresStorage::setup(&pool)
        .await
        .map_err(|e| AppError::internal(format!("Failed to setup job storage: {}", e)))?;

    Ok(pool)
}

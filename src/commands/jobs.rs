//! Jobs command - Background job management.
//!
//! - `work`: run the payment expiry worker
//! - `list`: show queued jobs by status
//! - `clear`: remove failed jobs from the queue
//!
//! ```bash
//! order-eat jobs work
//! order-eat jobs list
//! ```

use std::sync::Arc;

use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

use super::connect_job_pool;
use crate::cli::args::{JobsAction, JobsArgs};
use crate::config::{Config, JOB_NAME_PAYMENT_EXPIRY};
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, Persistence};

/// Execute the jobs command
pub async fn execute(args: JobsArgs, config: Config) -> AppResult<()> {
    match args.action {
        JobsAction::Work => run_worker(&config).await,
        JobsAction::List => list_jobs(&config).await,
        JobsAction::Clear => clear_failed_jobs(&config).await,
    }
}

/// Consume payment expiry jobs until Ctrl+C
async fn run_worker(config: &Config) -> AppResult<()> {
    use apalis::prelude::*;
    use apalis_sql::postgres::PostgresStorage;

    use crate::jobs::{payment_expiry_handler, ExpirePaymentJob};

    tracing::info!("Connecting to database for job worker...");

    let pool = connect_job_pool(config).await?;
    let storage: PostgresStorage<ExpirePaymentJob> = PostgresStorage::new(pool);

    let db = Database::connect(config).await?;
    let uow = Arc::new(Persistence::new(db.get_connection()));

    let worker = WorkerBuilder::new(JOB_NAME_PAYMENT_EXPIRY)
        .data(uow)
        .backend(storage)
        .build_fn(payment_expiry_handler);

    tracing::info!("Job worker started. Press Ctrl+C to stop.");

    let monitor = Monitor::new().register(worker);

    tokio::select! {
        result = monitor.run() => {
            if let Err(e) = result {
                tracing::error!("Worker error: {}", e);
                return Err(AppError::internal(format!("Worker failed: {}", e)));
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping worker...");
        }
    }

    tracing::info!("Job worker stopped.");
    Ok(())
}

/// Print job counts per status
async fn list_jobs(config: &Config) -> AppResult<()> {
    let db = Database::connect(config).await?;
    let conn = db.get_connection();

    if !queue_initialized(&conn).await? {
        println!("Job queue not initialized. Run 'jobs work' or 'serve' first.");
        return Ok(());
    }

    let rows = conn
        .query_all(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT status::text AS status, COUNT(*)::bigint AS count FROM apalis.jobs GROUP BY status ORDER BY status",
        ))
        .await?;

    println!("\n=== Job Queue Status ===");
    if rows.is_empty() {
        println!("Queue is empty");
    }
    for row in rows {
        let status: String = row.try_get("", "status")?;
        let count: i64 = row.try_get("", "count")?;
        println!("{:<10}{}", format!("{}:", status), count);
    }
    println!("========================\n");

    Ok(())
}

/// Clear failed jobs from the queue
async fn clear_failed_jobs(config: &Config) -> AppResult<()> {
    let db = Database::connect(config).await?;
    let conn = db.get_connection();

    if !queue_initialized(&conn).await? {
        println!("Job queue not initialized. Nothing to clear.");
        return Ok(());
    }

    let result = conn
        .execute(Statement::from_string(
            DatabaseBackend::Postgres,
            "DELETE FROM apalis.jobs WHERE status = 'Failed'",
        ))
        .await?;

    println!(
        "Cleared {} failed job(s) from the queue.",
        result.rows_affected()
    );
    Ok(())
}

async fn queue_initialized(conn: &DatabaseConnection) -> AppResult<bool> {
    let row = conn
        .query_one(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT EXISTS(SELECT 1 FROM information_schema.schemata WHERE schema_name = 'apalis') AS exists",
        ))
        .await?;

    Ok(row
        .and_then(|r| r.try_get::<bool>("", "exists").ok())
        .unwrap_or(false))
}

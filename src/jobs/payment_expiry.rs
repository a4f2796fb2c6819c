//! Payment expiry job.
//!
//! Every non-cash payment schedules one of these when it is created. When
//! it fires, a transaction that is still `pending` is marked `failed` so
//! the client's status poll stops and the order can be paid again.

use apalis::prelude::*;
use apalis_sql::postgres::PostgresStorage;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::infra::Persistence;
use crate::services::expire_pending_payment;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Job payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpirePaymentJob {
    pub transaction_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl ExpirePaymentJob {
    pub fn new(transaction_id: Uuid, ttl_seconds: u64) -> Self {
        let ttl = chrono::Duration::seconds(ttl_seconds.min(u32::MAX as u64) as i64);
        Self {
            transaction_id,
            expires_at: Utc::now() + ttl,
        }
    }
}

/// Enqueues expiry jobs; services depend on this instead of the storage
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PaymentQueue: Send + Sync {
    async fn schedule_expiry(&self, job: ExpirePaymentJob) -> AppResult<()>;
}

/// PostgreSQL-backed queue shared with the `jobs work` process
#[derive(Clone)]
pub struct PaymentExpiryQueue {
    storage: PostgresStorage<ExpirePaymentJob>,
}

impl PaymentExpiryQueue {
    pub fn new(storage: PostgresStorage<ExpirePaymentJob>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl PaymentQueue for PaymentExpiryQueue {
    async fn schedule_expiry(&self, job: ExpirePaymentJob) -> AppResult<()> {
        let mut storage = self.storage.clone();
        let run_at = job.expires_at.timestamp();
        let transaction_id = job.transaction_id;

        storage
            .schedule(job, run_at)
            .await
            .map_err(|e| AppError::internal(format!("Failed to schedule payment expiry: {}", e)))?;

        tracing::debug!(transaction_id = %transaction_id, run_at, "Payment expiry scheduled");
        Ok(())
    }
}

/// Worker handler: fail the transaction if nobody settled it in time
pub async fn payment_expiry_handler(
    job: ExpirePaymentJob,
    uow: Data<Arc<Persistence>>,
) -> Result<(), AppError> {
    // Scheduling is second-granular; never expire early
    let remaining = job.expires_at - Utc::now();
    if let Ok(wait) = remaining.to_std() {
        tokio::time::sleep(wait).await;
    }

    let expired = expire_pending_payment(&**uow, job.transaction_id).await?;

    if expired {
        tracing::info!(transaction_id = %job.transaction_id, "Pending payment expired");
    } else {
        tracing::debug!(transaction_id = %job.transaction_id, "Payment already settled, nothing to expire");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_expires_after_ttl() {
        let before = Utc::now();
        let job = ExpirePaymentJob::new(Uuid::new_v4(), 900);
        let delta = job.expires_at - before;

        assert!(delta.num_seconds() >= 899 && delta.num_seconds() <= 901);
    }

    #[test]
    fn test_job_payload_is_stable_json() {
        let job = ExpirePaymentJob::new(Uuid::nil(), 0);
        let json = serde_json::to_value(&job).unwrap();

        assert_eq!(json["transaction_id"], Uuid::nil().to_string());
        assert!(json.get("expires_at").is_some());
    }
}

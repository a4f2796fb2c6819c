//! Payment service - pending transactions, status polling and settlement.
//!
//! Every write that settles a payment runs under a Redis lock on the order
//! and inside one DB transaction that row-locks the payment, so a gateway
//! callback racing the expiry worker settles it exactly once. An order has
//! at most one pending payment and never more than one successful one.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::PAYMENT_POLL_INTERVAL_SECONDS;
use crate::domain::{
    Actor, NewTransaction, OrderStatus, PaymentMethod, PaymentStatus, TransactionStatus,
    UserTransaction,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{CacheStore, UnitOfWork};
use crate::jobs::{ExpirePaymentJob, PaymentQueue};
use crate::types::{Paginated, PaginationParams};
use crate::with_transaction;

#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Open a payment for the full order total
    async fn create_payment(
        &self,
        actor: Actor,
        order_id: Uuid,
        method: PaymentMethod,
    ) -> AppResult<UserTransaction>;

    /// Polled by the checkout page until `settled` is true
    async fn payment_status(&self, actor: Actor, id: Uuid) -> AppResult<PaymentStatus>;

    /// Settle a pending payment (gateway callback stand-in)
    async fn confirm_payment(&self, id: Uuid, success: bool) -> AppResult<UserTransaction>;

    async fn list_payments(
        &self,
        order_id: Option<Uuid>,
        params: PaginationParams,
    ) -> AppResult<Paginated<UserTransaction>>;
}

pub struct PaymentManager<U: UnitOfWork> {
    uow: Arc<U>,
    cache: Arc<dyn CacheStore>,
    queue: Arc<dyn PaymentQueue>,
    expiry_seconds: u64,
}

impl<U: UnitOfWork> PaymentManager<U> {
    pub fn new(
        uow: Arc<U>,
        cache: Arc<dyn CacheStore>,
        queue: Arc<dyn PaymentQueue>,
        expiry_seconds: u64,
    ) -> Self {
        Self {
            uow,
            cache,
            queue,
            expiry_seconds,
        }
    }

    async fn schedule_expiry(&self, transaction: &UserTransaction) {
        if transaction.status != TransactionStatus::Pending {
            return;
        }

        let job = ExpirePaymentJob::new(transaction.id, self.expiry_seconds);
        if let Err(e) = self.queue.schedule_expiry(job).await {
            tracing::warn!(
                transaction_id = %transaction.id,
                error = %e,
                "Failed to schedule payment expiry"
            );
        }
    }
}

fn payment_lock_key(order_id: Uuid) -> String {
    format!("payment:order:{}", order_id)
}

/// Run `work` while holding the order's payment lock.
///
/// Anything that settles a payment or cancels its order goes through here.
pub(crate) async fn with_payment_lock<T, Fut>(
    cache: &dyn CacheStore,
    order_id: Uuid,
    work: Fut,
) -> AppResult<T>
where
    Fut: Future<Output = AppResult<T>> + Send,
    T: Send,
{
    let lock = cache.acquire_lock(&payment_lock_key(order_id)).await?;
    let result = work.await;

    if let Err(e) = lock.release().await {
        tracing::warn!(order_id = %order_id, error = %e, "Failed to release payment lock");
    }
    result
}

#[async_trait]
impl<U: UnitOfWork> PaymentService for PaymentManager<U> {
    async fn create_payment(
        &self,
        actor: Actor,
        order_id: Uuid,
        method: PaymentMethod,
    ) -> AppResult<UserTransaction> {
        let order = self
            .uow
            .orders()
            .find_by_id(order_id)
            .await?
            .ok_or_not_found("Order")?;

        if !actor.can_access(order.user_id) {
            return Err(AppError::Forbidden);
        }
        if order.status == OrderStatus::Cancelled {
            return Err(AppError::bad_request("A cancelled order cannot be paid"));
        }

        let uow = self.uow.clone();
        let (transaction, superseded) = with_payment_lock(self.cache.as_ref(), order_id, async move {
            with_transaction!(uow, |ctx| {
                let order = ctx
                    .orders()
                    .find_by_id(order_id)
                    .await?
                    .ok_or_not_found("Order")?;
                if order.status == OrderStatus::Cancelled {
                    return Err(AppError::bad_request("A cancelled order cannot be paid"));
                }
                if ctx.transactions().has_success(order_id).await? {
                    return Err(AppError::conflict("Order has already been paid"));
                }

                // A new attempt replaces any payment still pending for the order
                let superseded = ctx.transactions().fail_pending(order_id).await?;
                let transaction = ctx
                    .transactions()
                    .create(NewTransaction::for_order(order.id, order.total_amount, method))
                    .await?;

                if transaction.status == TransactionStatus::Success
                    && order.status == OrderStatus::Pending
                {
                    ctx.orders()
                        .update_status(order.id, OrderStatus::Confirmed)
                        .await?;
                }

                Ok((transaction, superseded))
            })
        })
        .await?;

        tracing::info!(
            transaction_id = %transaction.id,
            order_id = %order_id,
            method = method.as_str(),
            status = transaction.status.as_str(),
            superseded,
            "Payment created"
        );

        self.schedule_expiry(&transaction).await;
        Ok(transaction)
    }

    async fn payment_status(&self, actor: Actor, id: Uuid) -> AppResult<PaymentStatus> {
        let transaction = self
            .uow
            .transactions()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Payment")?;
        let order = self
            .uow
            .orders()
            .find_by_id(transaction.order_id)
            .await?
            .ok_or_not_found("Order")?;

        if !actor.can_access(order.user_id) {
            return Err(AppError::Forbidden);
        }

        Ok(PaymentStatus {
            transaction_id: transaction.id,
            order_id: order.id,
            status: transaction.status,
            order_status: order.status,
            settled: transaction.status.is_settled(),
            poll_interval_seconds: PAYMENT_POLL_INTERVAL_SECONDS,
        })
    }

    async fn confirm_payment(&self, id: Uuid, success: bool) -> AppResult<UserTransaction> {
        let existing = self
            .uow
            .transactions()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Payment")?;
        let order_id = existing.order_id;

        let uow = self.uow.clone();
        let settled = with_payment_lock(self.cache.as_ref(), order_id, async move {
            with_transaction!(uow, |ctx| {
                let current = ctx
                    .transactions()
                    .find_for_update(id)
                    .await?
                    .ok_or_not_found("Payment")?;
                if current.status.is_settled() {
                    return Err(AppError::conflict(format!(
                        "Payment is already {}",
                        current.status.as_str()
                    )));
                }
                if !success {
                    return ctx
                        .transactions()
                        .update_status(id, TransactionStatus::Failed)
                        .await;
                }

                if ctx.transactions().has_success(order_id).await? {
                    return Err(AppError::conflict("Order has already been paid"));
                }
                let order = ctx
                    .orders()
                    .find_by_id(order_id)
                    .await?
                    .ok_or_not_found("Order")?;
                if order.status == OrderStatus::Cancelled {
                    return Err(AppError::conflict("Order has been cancelled"));
                }

                let updated = ctx
                    .transactions()
                    .update_status(id, TransactionStatus::Success)
                    .await?;
                if order.status == OrderStatus::Pending {
                    ctx.orders()
                        .update_status(order_id, OrderStatus::Confirmed)
                        .await?;
                }

                Ok(updated)
            })
        })
        .await?;

        tracing::info!(
            transaction_id = %id,
            order_id = %order_id,
            status = settled.status.as_str(),
            "Payment settled"
        );
        Ok(settled)
    }

    async fn list_payments(
        &self,
        order_id: Option<Uuid>,
        params: PaginationParams,
    ) -> AppResult<Paginated<UserTransaction>> {
        self.uow.transactions().list(order_id, params).await
    }
}

/// Fail a payment that is still pending.
///
/// Returns `true` when this call expired it, `false` when it was already
/// settled or no longer exists.
pub async fn expire_pending_payment<U: UnitOfWork>(uow: &U, id: Uuid) -> AppResult<bool> {
    with_transaction!(uow, |ctx| {
        let Some(current) = ctx.transactions().find_for_update(id).await? else {
            return Ok(false);
        };
        if current.status != TransactionStatus::Pending {
            return Ok(false);
        }

        ctx.transactions()
            .update_status(id, TransactionStatus::Failed)
            .await?;
        Ok(true)
    })
}

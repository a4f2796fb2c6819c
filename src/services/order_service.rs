//! Order service - checkout, order lifecycle and in-store quick orders.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::container::parallel;
use super::payment_service::with_payment_lock;
use crate::domain::pricing::referenced_dish_ids;
use crate::domain::{
    price_cart, Actor, CartLine, CartQuote, NewOrder, NewTransaction, Order, OrderFilter,
    OrderStatus, OrderType, PaymentMethod, TransactionStatus, UserTransaction,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{CacheStore, UnitOfWork};
use crate::jobs::{ExpirePaymentJob, PaymentQueue};
use crate::types::{Paginated, PaginationParams};
use crate::with_transaction;

/// A storefront checkout
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub items: Vec<CartLine>,
    pub order_type: OrderType,
    pub delivery_address: Option<String>,
}

/// An order keyed in at the counter by staff
#[derive(Debug, Clone)]
pub struct QuickOrder {
    pub items: Vec<CartLine>,
    /// Defaults to the admin placing the order
    pub customer_id: Option<Uuid>,
    pub payment_method: PaymentMethod,
}

/// Quick order together with its payment
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuickOrderReceipt {
    pub order: Order,
    pub transaction: UserTransaction,
}

#[async_trait]
pub trait OrderService: Send + Sync {
    /// Price a cart against the current menu without saving anything
    async fn quote(&self, items: Vec<CartLine>) -> AppResult<CartQuote>;

    async fn create_order(&self, actor: Actor, order: PlaceOrder) -> AppResult<Order>;

    /// Admins see every order; everyone else only their own
    async fn list_orders(
        &self,
        actor: Actor,
        filter: OrderFilter,
        params: PaginationParams,
    ) -> AppResult<Paginated<Order>>;

    async fn get_order(&self, actor: Actor, id: Uuid) -> AppResult<Order>;

    /// Move an order along the status lifecycle (admin)
    async fn update_status(&self, id: Uuid, status: OrderStatus) -> AppResult<Order>;

    /// Customer cancellation, allowed while the order is still pending
    async fn cancel_order(&self, actor: Actor, id: Uuid) -> AppResult<Order>;

    async fn delete_order(&self, id: Uuid) -> AppResult<()>;

    /// Create a pickup order and its payment in one transaction
    async fn quick_order(&self, actor: Actor, order: QuickOrder) -> AppResult<QuickOrderReceipt>;
}

pub struct OrderManager<U: UnitOfWork> {
    uow: Arc<U>,
    cache: Arc<dyn CacheStore>,
    queue: Arc<dyn PaymentQueue>,
    payment_expiry_seconds: u64,
}

impl<U: UnitOfWork> OrderManager<U> {
    pub fn new(
        uow: Arc<U>,
        cache: Arc<dyn CacheStore>,
        queue: Arc<dyn PaymentQueue>,
        payment_expiry_seconds: u64,
    ) -> Self {
        Self {
            uow,
            cache,
            queue,
            payment_expiry_seconds,
        }
    }

    async fn find(&self, id: Uuid) -> AppResult<Order> {
        self.uow.orders().find_by_id(id).await?.ok_or_not_found("Order")
    }

    /// Cancel under the payment lock, failing any payment still pending.
    ///
    /// `check` re-validates the order as read inside the transaction.
    async fn cancel_locked<F>(&self, id: Uuid, check: F) -> AppResult<Order>
    where
        F: FnOnce(&Order) -> AppResult<()> + Send + 'static,
    {
        let uow = self.uow.clone();
        let (cancelled, failed_payments) = with_payment_lock(self.cache.as_ref(), id, async move {
            with_transaction!(uow, |ctx| {
                let order = ctx.orders().find_by_id(id).await?.ok_or_not_found("Order")?;
                check(&order)?;

                let failed = ctx.transactions().fail_pending(id).await?;
                let cancelled = ctx
                    .orders()
                    .update_status(id, OrderStatus::Cancelled)
                    .await?;
                Ok((cancelled, failed))
            })
        })
        .await?;

        tracing::info!(order_id = %id, failed_payments, "Order cancelled");
        Ok(cancelled)
    }
}

fn ensure_customer_can_cancel(order: &Order, customer_id: Uuid) -> AppResult<()> {
    if !order.is_owned_by(customer_id) {
        return Err(AppError::Forbidden);
    }
    if order.status != OrderStatus::Pending {
        return Err(AppError::bad_request(format!(
            "Only pending orders can be cancelled; this order is {}",
            order.status
        )));
    }
    Ok(())
}

/// Pick the address a delivery goes to; pickups never carry one
fn resolve_delivery_address(
    order_type: OrderType,
    requested: Option<String>,
    saved: Option<String>,
) -> AppResult<Option<String>> {
    if order_type == OrderType::Pickup {
        return Ok(None);
    }

    [requested, saved]
        .into_iter()
        .flatten()
        .map(|a| a.trim().to_string())
        .find(|a| !a.is_empty())
        .map(Some)
        .ok_or_else(|| AppError::validation("Delivery address is required for delivery orders"))
}

#[async_trait]
impl<U: UnitOfWork> OrderService for OrderManager<U> {
    async fn quote(&self, items: Vec<CartLine>) -> AppResult<CartQuote> {
        let dishes = self
            .uow
            .dishes()
            .find_by_ids(referenced_dish_ids(&items))
            .await?;
        price_cart(&items, &dishes)
    }

    async fn create_order(&self, actor: Actor, order: PlaceOrder) -> AppResult<Order> {
        let (user, dishes) = parallel::join2(
            self.uow.users().find_by_id(actor.id),
            self.uow.dishes().find_by_ids(referenced_dish_ids(&order.items)),
        )
        .await?;
        let user = user.ok_or_not_found("User")?;

        let quote = price_cart(&order.items, &dishes)?;
        let delivery_address =
            resolve_delivery_address(order.order_type, order.delivery_address, user.address)?;

        let created = self
            .uow
            .orders()
            .create(NewOrder::from_quote(
                user.id,
                quote,
                order.order_type,
                delivery_address,
                OrderStatus::Pending,
            ))
            .await?;

        tracing::info!(
            order_id = %created.id,
            user_id = %created.user_id,
            total = created.total_amount,
            "Order placed"
        );
        Ok(created)
    }

    async fn list_orders(
        &self,
        actor: Actor,
        filter: OrderFilter,
        params: PaginationParams,
    ) -> AppResult<Paginated<Order>> {
        let filter = if actor.is_admin() {
            filter
        } else {
            OrderFilter {
                user_id: Some(actor.id),
                ..filter
            }
        };

        self.uow.orders().list(filter, params).await
    }

    async fn get_order(&self, actor: Actor, id: Uuid) -> AppResult<Order> {
        let order = self.find(id).await?;
        if !actor.can_access(order.user_id) {
            return Err(AppError::Forbidden);
        }
        Ok(order)
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> AppResult<Order> {
        let order = self.find(id).await?;
        order.ensure_transition(status)?;

        if status == OrderStatus::Cancelled {
            return self
                .cancel_locked(id, move |current| current.ensure_transition(status))
                .await;
        }

        let updated = self.uow.orders().update_status(id, status).await?;
        tracing::info!(order_id = %id, from = %order.status, to = %status, "Order status changed");
        Ok(updated)
    }

    async fn cancel_order(&self, actor: Actor, id: Uuid) -> AppResult<Order> {
        let order = self.find(id).await?;
        ensure_customer_can_cancel(&order, actor.id)?;

        let customer_id = actor.id;
        self.cancel_locked(id, move |current| {
            ensure_customer_can_cancel(current, customer_id)
        })
        .await
    }

    async fn delete_order(&self, id: Uuid) -> AppResult<()> {
        self.uow.orders().delete(id).await?;
        tracing::info!(order_id = %id, "Order deleted");
        Ok(())
    }

    async fn quick_order(&self, actor: Actor, order: QuickOrder) -> AppResult<QuickOrderReceipt> {
        let customer_id = order.customer_id.unwrap_or(actor.id);
        let method = order.payment_method;
        let items = order.items;
        let dish_ids = referenced_dish_ids(&items);

        let receipt = with_transaction!(self.uow, |ctx| {
            let customer = ctx
                .users()
                .find_by_id(customer_id)
                .await?
                .ok_or_not_found("User")?;
            let dishes = ctx.dishes().find_by_ids(dish_ids).await?;
            let quote = price_cart(&items, &dishes)?;

            let status = if method.settles_immediately() {
                OrderStatus::Confirmed
            } else {
                OrderStatus::Pending
            };
            let order = ctx
                .orders()
                .create(NewOrder::from_quote(
                    customer.id,
                    quote,
                    OrderType::Pickup,
                    None,
                    status,
                ))
                .await?;
            let transaction = ctx
                .transactions()
                .create(NewTransaction::for_order(order.id, order.total_amount, method))
                .await?;

            Ok(QuickOrderReceipt { order, transaction })
        })?;

        tracing::info!(
            order_id = %receipt.order.id,
            transaction_id = %receipt.transaction.id,
            method = method.as_str(),
            "Quick order created"
        );

        if receipt.transaction.status == TransactionStatus::Pending {
            let job = ExpirePaymentJob::new(receipt.transaction.id, self.payment_expiry_seconds);
            if let Err(e) = self.queue.schedule_expiry(job).await {
                tracing::warn!(
                    transaction_id = %receipt.transaction.id,
                    error = %e,
                    "Failed to schedule payment expiry"
                );
            }
        }

        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::infra::repositories::{MockDishRepository, MockOrderRepository, MockUserRepository};
    use crate::infra::{MockCacheStore, Persistence};
    use crate::jobs::MockPaymentQueue;
    use crate::services::test_support::{
        self, dish_row, executed, free_lock, order_row, order_row_in, payment_row, persistence,
        postgres, rows_affected, statements_like, user_row, MockUow, TestUnitOfWork,
    };
    use mockall::predicate::eq;

    const UPDATE_PAYMENTS: &str = r#"UPDATE "user_transactions""#;
    const INSERT_ORDER: &str = r#"INSERT INTO "orders""#;
    const INSERT_PAYMENT: &str = r#"INSERT INTO "user_transactions""#;

    fn service(uow: TestUnitOfWork) -> OrderManager<MockUow> {
        OrderManager::new(
            uow.build(),
            Arc::new(MockCacheStore::new()),
            Arc::new(MockPaymentQueue::new()),
            900,
        )
    }

    fn scripted(
        uow: Arc<Persistence>,
        cache: MockCacheStore,
        queue: MockPaymentQueue,
    ) -> OrderManager<Persistence> {
        OrderManager::new(uow, Arc::new(cache), Arc::new(queue), 900)
    }

    fn lock_for(order_id: Uuid) -> MockCacheStore {
        free_lock(format!("payment:order:{}", order_id))
    }

    fn line(dish_id: Uuid, quantity: u32) -> CartLine {
        CartLine {
            dish_id,
            quantity,
            size: None,
            base: None,
            note: None,
        }
    }

    fn customer() -> Actor {
        Actor::new(Uuid::new_v4(), UserRole::User)
    }

    #[test]
    fn test_delivery_address_falls_back_to_saved() {
        let resolved = resolve_delivery_address(
            OrderType::Delivery,
            Some("   ".to_string()),
            Some("12 Lê Lợi".to_string()),
        )
        .unwrap();
        assert_eq!(resolved.as_deref(), Some("12 Lê Lợi"));

        let missing = resolve_delivery_address(OrderType::Delivery, None, None);
        assert!(matches!(missing, Err(AppError::Validation(_))));

        let pickup = resolve_delivery_address(OrderType::Pickup, Some("x".to_string()), None);
        assert_eq!(pickup.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_order_prices_from_menu() {
        let actor = customer();
        let mut user = test_support::user(UserRole::User);
        user.id = actor.id;
        let pizza = test_support::dish(150_000);
        let pizza_id = pizza.id;

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .with(eq(actor.id))
            .returning(move |_| Ok(Some(user.clone())));

        let mut dishes = MockDishRepository::new();
        dishes
            .expect_find_by_ids()
            .returning(move |_| Ok(vec![pizza.clone()]));

        let mut orders = MockOrderRepository::new();
        orders
            .expect_create()
            .withf(|o| {
                o.total_amount == 300_000
                    && o.status == OrderStatus::Pending
                    && o.delivery_address.as_deref() == Some("12 Lê Lợi, Quận 1")
            })
            .times(1)
            .returning(|o| {
                let mut order = test_support::order(o.user_id, o.status);
                order.total_amount = o.total_amount;
                order.delivery_address = o.delivery_address;
                Ok(order)
            });

        let svc = service(TestUnitOfWork {
            users: Some(users),
            dishes: Some(dishes),
            orders: Some(orders),
            ..Default::default()
        });

        let order = svc
            .create_order(
                actor,
                PlaceOrder {
                    items: vec![line(pizza_id, 2)],
                    order_type: OrderType::Delivery,
                    delivery_address: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(order.total_amount, 300_000);
        assert_eq!(order.user_id, actor.id);
    }

    #[tokio::test]
    async fn test_customer_listing_is_scoped_to_self() {
        let actor = customer();
        let someone_else = Uuid::new_v4();

        let mut orders = MockOrderRepository::new();
        orders
            .expect_list()
            .withf(move |filter, _| filter.user_id == Some(actor.id))
            .returning(|_, params| Ok(Paginated::new(vec![], &params, 0)));

        let svc = service(TestUnitOfWork {
            orders: Some(orders),
            ..Default::default()
        });

        let filter = OrderFilter {
            user_id: Some(someone_else),
            ..Default::default()
        };
        let page = svc
            .list_orders(actor, filter, PaginationParams::default())
            .await
            .unwrap();
        assert!(page.data.is_empty());
    }

    #[tokio::test]
    async fn test_other_users_order_is_forbidden() {
        let owner = Uuid::new_v4();
        let order = test_support::order(owner, OrderStatus::Pending);
        let id = order.id;

        let mut orders = MockOrderRepository::new();
        orders
            .expect_find_by_id()
            .returning(move |_| Ok(Some(order.clone())));

        let svc = service(TestUnitOfWork {
            orders: Some(orders),
            ..Default::default()
        });

        let result = svc.get_order(customer(), id).await;
        assert!(matches!(result, Err(AppError::Forbidden)));

        let admin = Actor::new(Uuid::new_v4(), UserRole::Admin);
        assert!(svc.get_order(admin, id).await.is_ok());
    }

    #[tokio::test]
    async fn test_cancel_requires_pending() {
        let actor = customer();
        let order = test_support::order(actor.id, OrderStatus::Preparing);
        let id = order.id;

        let mut orders = MockOrderRepository::new();
        orders
            .expect_find_by_id()
            .returning(move |_| Ok(Some(order.clone())));
        orders.expect_update_status().never();

        let svc = service(TestUnitOfWork {
            orders: Some(orders),
            ..Default::default()
        });

        let result = svc.cancel_order(actor, id).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_invalid_transition_is_rejected() {
        let order = test_support::order(Uuid::new_v4(), OrderStatus::Pending);
        let id = order.id;

        let mut orders = MockOrderRepository::new();
        orders
            .expect_find_by_id()
            .returning(move |_| Ok(Some(order.clone())));
        orders.expect_update_status().never();

        let svc = service(TestUnitOfWork {
            orders: Some(orders),
            ..Default::default()
        });

        let result = svc.update_status(id, OrderStatus::Completed).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_quote_rejects_unknown_dish() {
        let mut dishes = MockDishRepository::new();
        dishes.expect_find_by_ids().returning(|_| Ok(vec![]));

        let svc = service(TestUnitOfWork {
            dishes: Some(dishes),
            ..Default::default()
        });

        let result = svc.quote(vec![line(Uuid::new_v4(), 1)]).await;
        assert!(matches!(result, Err(AppError::NotFound("Dish"))));
    }

    #[tokio::test]
    async fn test_cancel_fails_pending_payments() {
        let actor = customer();
        let order = test_support::order(actor.id, OrderStatus::Pending);

        let (uow, conn) = persistence(
            postgres()
                // read before the lock, then again inside the transaction
                .append_query_results([[order_row(&order)], [order_row(&order)]])
                .append_exec_results([rows_affected(1)])
                .append_query_results([
                    [order_row(&order)],
                    [order_row_in(&order, OrderStatus::Cancelled)],
                ]),
        );
        let svc = scripted(uow, lock_for(order.id), MockPaymentQueue::new());

        let cancelled = svc.cancel_order(actor, order.id).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        let log = executed(conn);
        let failed = statements_like(&log, UPDATE_PAYMENTS);
        assert_eq!(failed.len(), 1);
        assert!(failed[0].contains(r#""failed""#));
    }

    #[tokio::test]
    async fn test_cancel_rechecks_status_under_lock() {
        let actor = customer();
        let order = test_support::order(actor.id, OrderStatus::Pending);
        let mut confirmed = order.clone();
        confirmed.status = OrderStatus::Confirmed;

        // a payment confirmed the order between the first read and the lock
        let (uow, conn) = persistence(
            postgres().append_query_results([[order_row(&order)], [order_row(&confirmed)]]),
        );
        let svc = scripted(uow, lock_for(order.id), MockPaymentQueue::new());

        let result = svc.cancel_order(actor, order.id).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert!(statements_like(&executed(conn), UPDATE_PAYMENTS).is_empty());
    }

    #[tokio::test]
    async fn test_admin_cancel_takes_payment_lock() {
        let order = test_support::order(Uuid::new_v4(), OrderStatus::Confirmed);

        let (uow, conn) = persistence(
            postgres()
                .append_query_results([[order_row(&order)], [order_row(&order)]])
                .append_exec_results([rows_affected(0)])
                .append_query_results([
                    [order_row(&order)],
                    [order_row_in(&order, OrderStatus::Cancelled)],
                ]),
        );
        let svc = scripted(uow, lock_for(order.id), MockPaymentQueue::new());

        let cancelled = svc
            .update_status(order.id, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(statements_like(&executed(conn), UPDATE_PAYMENTS).len(), 1);
    }

    #[tokio::test]
    async fn test_cash_quick_order_is_confirmed_and_paid() {
        let admin = Actor::new(Uuid::new_v4(), UserRole::Admin);
        let mut staff = test_support::user(UserRole::Admin);
        staff.id = admin.id;
        let pizza = test_support::dish(150_000);
        let order = test_support::order(admin.id, OrderStatus::Confirmed);
        let mut receipt = test_support::payment(order.id, TransactionStatus::Success);
        receipt.method = PaymentMethod::Cash;

        let (uow, conn) = persistence(
            postgres()
                .append_query_results([[user_row(&staff)]])
                .append_query_results([[dish_row(&pizza)]])
                .append_query_results([[order_row(&order)]])
                .append_query_results([[payment_row(&receipt)]]),
        );
        let mut queue = MockPaymentQueue::new();
        queue.expect_schedule_expiry().never();
        let svc = scripted(uow, MockCacheStore::new(), queue);

        let created = svc
            .quick_order(
                admin,
                QuickOrder {
                    items: vec![line(pizza.id, 2)],
                    customer_id: None,
                    payment_method: PaymentMethod::Cash,
                },
            )
            .await
            .unwrap();
        assert_eq!(created.transaction.status, TransactionStatus::Success);

        let log = executed(conn);
        let order_insert = statements_like(&log, INSERT_ORDER);
        assert!(order_insert[0].contains(r#""confirmed""#));
        assert!(order_insert[0].contains("300000"));
        assert!(statements_like(&log, INSERT_PAYMENT)[0].contains(r#""success""#));
    }

    #[tokio::test]
    async fn test_online_quick_order_waits_for_payment() {
        let admin = Actor::new(Uuid::new_v4(), UserRole::Admin);
        let customer = test_support::user(UserRole::User);
        let pizza = test_support::dish(150_000);
        let order = test_support::order(customer.id, OrderStatus::Pending);
        let pending = test_support::payment(order.id, TransactionStatus::Pending);
        let pending_id = pending.id;

        let (uow, conn) = persistence(
            postgres()
                .append_query_results([[user_row(&customer)]])
                .append_query_results([[dish_row(&pizza)]])
                .append_query_results([[order_row(&order)]])
                .append_query_results([[payment_row(&pending)]]),
        );
        let mut queue = MockPaymentQueue::new();
        queue
            .expect_schedule_expiry()
            .withf(move |job| job.transaction_id == pending_id)
            .times(1)
            .returning(|_| Ok(()));
        let svc = scripted(uow, MockCacheStore::new(), queue);

        let created = svc
            .quick_order(
                admin,
                QuickOrder {
                    items: vec![line(pizza.id, 1)],
                    customer_id: Some(customer.id),
                    payment_method: PaymentMethod::Zalopay,
                },
            )
            .await
            .unwrap();
        assert_eq!(created.transaction.status, TransactionStatus::Pending);

        let log = executed(conn);
        assert!(statements_like(&log, INSERT_ORDER)[0].contains(r#""pending""#));
        assert!(statements_like(&log, INSERT_PAYMENT)[0].contains(r#""pending""#));
    }
}

//! Shared fixtures for service unit tests.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    Dish, DishStatus, Order, OrderItem, OrderStatus, OrderType, User, UserRole, UserTransaction,
    PaymentMethod, TransactionStatus,
};
use crate::errors::{AppError, AppResult};
use crate::infra::repositories::entities::{
    dish as dish_entity, order as order_entity, user as user_entity, user_transaction,
};
use crate::infra::repositories::{
    MockCategoryRepository, MockDishRepository, MockOrderRepository, MockReviewRepository,
    MockTransactionRepository, MockUserRepository,
};
use crate::infra::{
    CategoryRepository, DistributedLock, DishRepository, MockCacheStore, OrderRepository,
    Persistence, ReviewRepository, TransactionContext, TransactionRepository, TxFuture,
    UnitOfWork, UserRepository,
};

/// UnitOfWork over mock repositories.
///
/// Transactions are not supported; workflows that open one run against
/// [`persistence`] instead.
#[derive(Default)]
pub(crate) struct TestUnitOfWork {
    pub users: Option<MockUserRepository>,
    pub categories: Option<MockCategoryRepository>,
    pub dishes: Option<MockDishRepository>,
    pub orders: Option<MockOrderRepository>,
    pub reviews: Option<MockReviewRepository>,
    pub transactions: Option<MockTransactionRepository>,
}

/// Frozen view of a `TestUnitOfWork`, shareable behind `Arc`
pub(crate) struct MockUow {
    users: Arc<MockUserRepository>,
    categories: Arc<MockCategoryRepository>,
    dishes: Arc<MockDishRepository>,
    orders: Arc<MockOrderRepository>,
    reviews: Arc<MockReviewRepository>,
    transactions: Arc<MockTransactionRepository>,
}

impl TestUnitOfWork {
    pub fn build(self) -> Arc<MockUow> {
        Arc::new(MockUow {
            users: Arc::new(self.users.unwrap_or_default()),
            categories: Arc::new(self.categories.unwrap_or_default()),
            dishes: Arc::new(self.dishes.unwrap_or_default()),
            orders: Arc::new(self.orders.unwrap_or_default()),
            reviews: Arc::new(self.reviews.unwrap_or_default()),
            transactions: Arc::new(self.transactions.unwrap_or_default()),
        })
    }
}

#[async_trait]
impl UnitOfWork for MockUow {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn categories(&self) -> Arc<dyn CategoryRepository> {
        self.categories.clone()
    }

    fn dishes(&self) -> Arc<dyn DishRepository> {
        self.dishes.clone()
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.orders.clone()
    }

    fn reviews(&self) -> Arc<dyn ReviewRepository> {
        self.reviews.clone()
    }

    fn transactions(&self) -> Arc<dyn TransactionRepository> {
        self.transactions.clone()
    }

    async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        Err(AppError::internal("Transactions not supported in test mock"))
    }
}

pub(crate) fn user(role: UserRole) -> User {
    User {
        id: Uuid::new_v4(),
        email: "khach@ordereat.vn".to_string(),
        password_hash: "hashed".to_string(),
        name: "Nguyễn Văn A".to_string(),
        phone: Some("0901234567".to_string()),
        address: Some("12 Lê Lợi, Quận 1".to_string()),
        role,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        deleted_at: None,
    }
}

pub(crate) fn dish(base_price: i64) -> Dish {
    Dish {
        id: Uuid::new_v4(),
        name: "Pizza Hải Sản".to_string(),
        description: None,
        base_price,
        status: DishStatus::Available,
        category_id: Uuid::new_v4(),
        size: None,
        type_name: Some("pizza".to_string()),
        image_url: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub(crate) fn order(user_id: Uuid, status: OrderStatus) -> Order {
    Order {
        id: Uuid::new_v4(),
        user_id,
        order_items: vec![OrderItem {
            dish_id: Uuid::new_v4(),
            dish_name: Some("Pizza Hải Sản".to_string()),
            quantity: 2,
            price: 150_000,
            size: None,
            base: None,
            note: None,
        }],
        total_amount: 300_000,
        status,
        order_type: OrderType::Pickup,
        delivery_address: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub(crate) fn payment(order_id: Uuid, status: TransactionStatus) -> UserTransaction {
    UserTransaction {
        id: Uuid::new_v4(),
        order_id,
        amount: 300_000,
        method: PaymentMethod::Zalopay,
        status,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

// =============================================================================
// Scripted database
// =============================================================================

/// `Persistence` over a sea-orm mock database, plus a handle for reading
/// back the statements it ran. Results are consumed in query order.
pub(crate) fn persistence(db: MockDatabase) -> (Arc<Persistence>, DatabaseConnection) {
    let conn = db.into_connection();
    (Arc::new(Persistence::new(conn.clone())), conn)
}

pub(crate) fn postgres() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
}

/// Every statement the mock database saw, with its bound values
pub(crate) fn executed(conn: DatabaseConnection) -> Vec<String> {
    conn.into_transaction_log()
        .iter()
        .flat_map(|t| t.statements().iter())
        .map(|s| format!("{} {:?}", s.sql, s.values))
        .collect()
}

/// Statements starting with `prefix`, e.g. `UPDATE "orders"`
pub(crate) fn statements_like<'a>(log: &'a [String], prefix: &str) -> Vec<&'a String> {
    log.iter().filter(|s| s.starts_with(prefix)).collect()
}

/// Result row of a `COUNT(*)` query
pub(crate) fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::from(n))])
}

pub(crate) fn rows_affected(n: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected: n,
    }
}

pub(crate) fn user_row(user: &User) -> user_entity::Model {
    user_entity::Model {
        id: user.id,
        email: user.email.clone(),
        password_hash: user.password_hash.clone(),
        name: user.name.clone(),
        phone: user.phone.clone(),
        address: user.address.clone(),
        role: user.role.as_str().to_string(),
        is_active: user.is_active,
        created_at: user.created_at,
        updated_at: user.updated_at,
        deleted_at: user.deleted_at,
    }
}

pub(crate) fn dish_row(dish: &Dish) -> dish_entity::Model {
    dish_entity::Model {
        id: dish.id,
        name: dish.name.clone(),
        description: dish.description.clone(),
        base_price: dish.base_price,
        status: dish.status.as_str().to_string(),
        category_id: dish.category_id,
        size: dish.size.clone(),
        type_name: dish.type_name.clone(),
        image_url: dish.image_url.clone(),
        created_at: dish.created_at,
        updated_at: dish.updated_at,
    }
}

pub(crate) fn order_row(order: &Order) -> order_entity::Model {
    order_entity::Model {
        id: order.id,
        user_id: order.user_id,
        order_items: serde_json::to_value(&order.order_items).unwrap(),
        total_amount: order.total_amount,
        status: order.status.as_str().to_string(),
        order_type: order.order_type.as_str().to_string(),
        delivery_address: order.delivery_address.clone(),
        created_at: order.created_at,
        updated_at: order.updated_at,
    }
}

/// `order` moved to `status`
pub(crate) fn order_row_in(order: &Order, status: OrderStatus) -> order_entity::Model {
    order_entity::Model {
        status: status.as_str().to_string(),
        ..order_row(order)
    }
}

pub(crate) fn payment_row(payment: &UserTransaction) -> user_transaction::Model {
    user_transaction::Model {
        id: payment.id,
        order_id: payment.order_id,
        amount: payment.amount,
        method: payment.method.as_str().to_string(),
        status: payment.status.as_str().to_string(),
        created_at: payment.created_at,
        updated_at: payment.updated_at,
    }
}

/// `payment` moved to `status`
pub(crate) fn payment_row_in(
    payment: &UserTransaction,
    status: TransactionStatus,
) -> user_transaction::Model {
    user_transaction::Model {
        status: status.as_str().to_string(),
        ..payment_row(payment)
    }
}

// =============================================================================
// Locks
// =============================================================================

struct HeldLock;

#[async_trait]
impl DistributedLock for HeldLock {
    async fn release(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}

/// A cache whose lock on `resource` is always free
pub(crate) fn free_lock(resource: String) -> MockCacheStore {
    let mut cache = MockCacheStore::new();
    cache
        .expect_acquire_lock()
        .withf(move |key| key == resource)
        .returning(|_| Ok(Box::new(HeldLock) as Box<dyn DistributedLock>));
    cache
}

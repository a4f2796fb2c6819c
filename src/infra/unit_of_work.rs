//! Unit of Work pattern implementation.
//!
//! Centralizes access to all repositories and owns the transaction
//! lifecycle (begin, commit, rollback) for workflows that touch more than
//! one aggregate, such as quick orders and payment confirmation.

use async_trait::async_trait;
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use uuid::Uuid;

use super::repositories::{
    dish_repository, order_repository, transaction_repository,
    user_repository, CategoryRepository, CategoryStore, DishRepository, DishStore,
    OrderRepository, OrderStore, ReviewRepository, ReviewStore, TransactionRepository,
    TransactionStore, UserRepository, UserStore,
};
use crate::domain::{
    Dish, NewOrder, NewTransaction, Order, OrderStatus, TransactionStatus, User, UserTransaction,
};
use crate::errors::{AppError, AppResult};

/// Boxed future returned by transaction closures
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Unit of Work trait for dependency injection.
///
/// Note: This trait is not mockable directly due to generic methods.
/// Tests implement it by hand around the `Mock*Repository` types.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn categories(&self) -> Arc<dyn CategoryRepository>;

    fn dishes(&self) -> Arc<dyn DishRepository>;

    fn orders(&self) -> Arc<dyn OrderRepository>;

    fn reviews(&self) -> Arc<dyn ReviewRepository>;

    fn transactions(&self) -> Arc<dyn TransactionRepository>;

    /// Execute a closure within a transaction.
    ///
    /// The transaction is committed on success or rolled back on error.
    /// Uses ReadCommitted isolation.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Transaction context providing repository access within a transaction.
///
/// All repository operations performed through this context are part
/// of the same database transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn users(&self) -> TxUserRepository<'_> {
        TxUserRepository { txn: self.txn }
    }

    pub fn dishes(&self) -> TxDishRepository<'_> {
        TxDishRepository { txn: self.txn }
    }

    pub fn orders(&self) -> TxOrderRepository<'_> {
        TxOrderRepository { txn: self.txn }
    }

    pub fn transactions(&self) -> TxTransactionRepository<'_> {
        TxTransactionRepository { txn: self.txn }
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    users: Arc<UserStore>,
    categories: Arc<CategoryStore>,
    dishes: Arc<DishStore>,
    orders: Arc<OrderStore>,
    reviews: Arc<ReviewStore>,
    transactions: Arc<TransactionStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: Arc::new(UserStore::new(db.clone())),
            categories: Arc::new(CategoryStore::new(db.clone())),
            dishes: Arc::new(DishStore::new(db.clone())),
            orders: Arc::new(OrderStore::new(db.clone())),
            reviews: Arc::new(ReviewStore::new(db.clone())),
            transactions: Arc::new(TransactionStore::new(db.clone())),
            db,
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
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

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::ReadCommitted), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::from)?;

        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// Transaction-aware user lookups
pub struct TxUserRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl TxUserRepository<'_> {
    /// Find active user by ID (excludes soft-deleted)
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        user_repository::find_active(self.txn, id).await
    }
}

/// Transaction-aware dish lookups, so prices are read in the same snapshot
/// the order is written in
pub struct TxDishRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl TxDishRepository<'_> {
    pub async fn find_by_ids(&self, ids: Vec<Uuid>) -> AppResult<Vec<Dish>> {
        dish_repository::load_many(self.txn, ids).await
    }
}

/// Transaction-aware order repository
pub struct TxOrderRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl TxOrderRepository<'_> {
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>> {
        order_repository::find(self.txn, id).await
    }

    pub async fn create(&self, order: NewOrder) -> AppResult<Order> {
        order_repository::insert(self.txn, order).await
    }

    pub async fn update_status(&self, id: Uuid, status: OrderStatus) -> AppResult<Order> {
        order_repository::set_status(self.txn, id, status).await
    }
}

/// Transaction-aware payment transaction repository
pub struct TxTransactionRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl TxTransactionRepository<'_> {
    /// Find and row-lock a transaction until commit
    pub async fn find_for_update(&self, id: Uuid) -> AppResult<Option<UserTransaction>> {
        transaction_repository::find_for_update(self.txn, id).await
    }

    pub async fn has_success(&self, order_id: Uuid) -> AppResult<bool> {
        transaction_repository::has_success(self.txn, order_id).await
    }

    /// Fail the order's pending transactions, returning how many changed
    pub async fn fail_pending(&self, order_id: Uuid) -> AppResult<u64> {
        transaction_repository::fail_pending(self.txn, order_id).await
    }

    pub async fn create(&self, transaction: NewTransaction) -> AppResult<UserTransaction> {
        transaction_repository::insert(self.txn, transaction).await
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: TransactionStatus,
    ) -> AppResult<UserTransaction> {
        transaction_repository::set_status(self.txn, id, status).await
    }
}

/// Run `$body` inside `$uow.transaction`, boxing the future for the caller.
///
/// The body may use `?`; it must evaluate to an `AppResult`. Everything it
/// captures is moved in, so capture owned values rather than `&self`.
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(|$ctx| {
            Box::pin(async move {
                let out: $crate::errors::AppResult<_> = $body;
                out
            })
        })
        .await
    };
}

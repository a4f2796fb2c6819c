//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections, migrations and repositories
//! - Caching, rate limiting and locks (Redis)
//! - Unit of Work for transaction management

pub mod cache;
pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use cache::{Cache, CacheStore, DistributedLock, LockGuard};

#[cfg(any(test, feature = "test-utils"))]
pub use cache::MockCacheStore;
pub use db::{Database, Migrator};
pub use repositories::{
    CategoryRepository, DishRepository, OrderRepository, ReviewRepository, TransactionRepository,
    UserRepository,
};
pub use unit_of_work::{
    Persistence, TransactionContext, TxDishRepository, TxFuture, TxOrderRepository,
    TxTransactionRepository, TxUserRepository, UnitOfWork,
};

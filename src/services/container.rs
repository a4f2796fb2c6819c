//! Service Container - Centralized service access with parallel execution support.
//!
//! Handlers depend on the `ServiceContainer` trait, never on concrete
//! managers, so the router can be driven by mock services in tests.

use std::future::Future;
use std::sync::Arc;

use super::{
    AuthService, Authenticator, CategoryManager, CategoryService, DishManager, DishService,
    OrderManager, OrderService, PaymentManager, PaymentService, ReportManager, ReportService,
    ReviewManager, ReviewService, UserManager, UserService,
};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{CacheStore, Persistence};
use crate::jobs::PaymentQueue;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn categories(&self) -> Arc<dyn CategoryService>;

    fn dishes(&self) -> Arc<dyn DishService>;

    fn orders(&self) -> Arc<dyn OrderService>;

    fn reviews(&self) -> Arc<dyn ReviewService>;

    fn payments(&self) -> Arc<dyn PaymentService>;

    fn reports(&self) -> Arc<dyn ReportService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    category_service: Arc<dyn CategoryService>,
    dish_service: Arc<dyn DishService>,
    order_service: Arc<dyn OrderService>,
    review_service: Arc<dyn ReviewService>,
    payment_service: Arc<dyn PaymentService>,
    report_service: Arc<dyn ReportService>,
}

impl Services {
    /// Wire every service over one shared `Persistence`
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        config: Config,
        cache: Arc<dyn CacheStore>,
        queue: Arc<dyn PaymentQueue>,
    ) -> Self {
        let uow = Arc::new(Persistence::new(db));
        let expiry = config.payment_expiry_seconds;

        Self {
            user_service: Arc::new(UserManager::new(uow.clone(), cache.clone())),
            category_service: Arc::new(CategoryManager::new(uow.clone())),
            dish_service: Arc::new(DishManager::new(uow.clone())),
            order_service: Arc::new(OrderManager::new(
                uow.clone(),
                cache.clone(),
                queue.clone(),
                expiry,
            )),
            review_service: Arc::new(ReviewManager::new(uow.clone())),
            payment_service: Arc::new(PaymentManager::new(
                uow.clone(),
                cache.clone(),
                queue,
                expiry,
            )),
            report_service: Arc::new(ReportManager::new(uow.clone())),
            auth_service: Arc::new(Authenticator::new(uow, cache, config)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn categories(&self) -> Arc<dyn CategoryService> {
        self.category_service.clone()
    }

    fn dishes(&self) -> Arc<dyn DishService> {
        self.dish_service.clone()
    }

    fn orders(&self) -> Arc<dyn OrderService> {
        self.order_service.clone()
    }

    fn reviews(&self) -> Arc<dyn ReviewService> {
        self.review_service.clone()
    }

    fn payments(&self) -> Arc<dyn PaymentService> {
        self.payment_service.clone()
    }

    fn reports(&self) -> Arc<dyn ReportService> {
        self.report_service.clone()
    }
}

/// Parallel execution utilities for running independent operations concurrently.
pub mod parallel {
    use super::*;
    use tokio::try_join;

    /// Execute two independent async operations in parallel.
    ///
    /// If either operation fails, the error is returned immediately.
    ///
    /// # Example
    /// ```ignore
    /// let (user, dishes) = parallel::join2(
    ///     uow.users().find_by_id(user_id),
    ///     uow.dishes().find_by_ids(dish_ids),
    /// ).await?;
    /// ```
    pub async fn join2<F1, F2, T1, T2>(f1: F1, f2: F2) -> AppResult<(T1, T2)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
    {
        try_join!(f1, f2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    #[tokio::test]
    async fn test_parallel_join2() {
        async fn op1() -> AppResult<i32> {
            Ok(1)
        }
        async fn op2() -> AppResult<&'static str> {
            Ok("two")
        }

        let (a, b) = parallel::join2(op1(), op2()).await.unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, "two");
    }

    #[tokio::test]
    async fn test_parallel_join2_short_circuits() {
        async fn fails() -> AppResult<i32> {
            Err(AppError::NotFound("User"))
        }
        async fn ok() -> AppResult<i32> {
            Ok(2)
        }

        let result = parallel::join2(fails(), ok()).await;
        assert!(matches!(result, Err(AppError::NotFound("User"))));
    }
}

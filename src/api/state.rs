//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{CacheStore, Database};
use crate::jobs::PaymentQueue;
use crate::services::{
    AuthService, CategoryService, DishService, OrderService, PaymentService, ReportService,
    ReviewService, ServiceContainer, Services, UserService,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub category_service: Arc<dyn CategoryService>,
    pub dish_service: Arc<dyn DishService>,
    pub order_service: Arc<dyn OrderService>,
    pub review_service: Arc<dyn ReviewService>,
    pub payment_service: Arc<dyn PaymentService>,
    pub report_service: Arc<dyn ReportService>,
    /// Redis cache (rate limits, health)
    pub cache: Arc<dyn CacheStore>,
    /// Database connection (health)
    pub database: Arc<Database>,
}

impl AppState {
    /// Build the production state: every service over one `Persistence`.
    pub fn from_config(
        database: Arc<Database>,
        cache: Arc<dyn CacheStore>,
        queue: Arc<dyn PaymentQueue>,
        config: Config,
    ) -> Self {
        let container = Services::from_connection(
            database.get_connection(),
            config,
            cache.clone(),
            queue,
        );

        Self::new(&container, cache, database)
    }

    /// Create application state from any service container.
    ///
    /// Tests pass a container of mock services here.
    pub fn new(
        container: &dyn ServiceContainer,
        cache: Arc<dyn CacheStore>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            auth_service: container.auth(),
            user_service: container.users(),
            category_service: container.categories(),
            dish_service: container.dishes(),
            order_service: container.orders(),
            review_service: container.reviews(),
            payment_service: container.payments(),
            report_service: container.reports(),
            cache,
            database,
        }
    }
}

//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! All services use Unit of Work pattern for centralized repository
//! access and transaction management.

mod auth_service;
mod category_service;
pub mod container;
mod dish_service;
mod order_service;
mod payment_service;
mod report_service;
mod review_service;
mod user_service;

#[cfg(test)]
pub(crate) mod test_support;

// Service Container
pub use container::{parallel, ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{
    create_account, AuthService, Authenticator, Claims, Registration, TokenResponse,
};
pub use category_service::{CategoryManager, CategoryService};
pub use dish_service::{DishManager, DishService};
pub use order_service::{OrderManager, OrderService, PlaceOrder, QuickOrder, QuickOrderReceipt};
pub use payment_service::{expire_pending_payment, PaymentManager, PaymentService};
pub use report_service::{ReportManager, ReportService};
pub use review_service::{ReviewManager, ReviewService};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;

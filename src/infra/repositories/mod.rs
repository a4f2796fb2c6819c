//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.
//! Query functions are generic over `ConnectionTrait` and shared with
//! the transaction-scoped repositories in `unit_of_work`.

mod base;
pub(crate) mod category_repository;
pub(crate) mod dish_repository;
pub(crate) mod entities;
pub(crate) mod order_repository;
pub(crate) mod review_repository;
pub(crate) mod transaction_repository;
pub(crate) mod user_repository;

pub use category_repository::{CategoryRepository, CategoryStore};
pub use dish_repository::{DishRepository, DishStore};
pub use order_repository::{OrderRepository, OrderStore};
pub use review_repository::{ReviewRepository, ReviewStore};
pub use transaction_repository::{TransactionRepository, TransactionStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use category_repository::MockCategoryRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use dish_repository::MockDishRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use order_repository::MockOrderRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use review_repository::MockReviewRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use transaction_repository::MockTransactionRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;

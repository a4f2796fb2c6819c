//! Domain layer - Core business entities and logic
//!
//! Entities, value objects and the pure rules of the shop (pricing,
//! order lifecycle, reporting). Nothing here touches the database.

pub mod category;
pub mod dish;
pub mod order;
pub mod password;
pub mod pricing;
pub mod report;
pub mod review;
pub mod transaction;
pub mod user;

pub use category::{Category, CategoryChanges};
pub use dish::{Dish, DishChanges, DishFilter, DishStatus, NewDish};
pub use order::{NewOrder, Order, OrderFilter, OrderItem, OrderStatus, OrderType};
pub use password::Password;
pub use pricing::{price_cart, CartLine, CartQuote, CrustBase, DishSize, PricedLine};
pub use report::{DailyRevenue, DateRange, RevenueReport};
pub use review::{NewReview, Review, ReviewChanges, ReviewFilter};
pub use transaction::{
    NewTransaction, PaymentMethod, PaymentStatus, TransactionStatus, UserTransaction,
};
pub use user::{Actor, NewUser, User, UserChanges, UserFilter, UserResponse, UserRole};

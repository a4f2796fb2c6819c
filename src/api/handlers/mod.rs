//! HTTP request handlers.

pub mod auth_handler;
pub mod category_handler;
pub mod dish_handler;
pub mod order_handler;
pub mod payment_handler;
pub mod report_handler;
pub mod review_handler;
pub mod user_handler;

pub use auth_handler::auth_routes;
pub use category_handler::{category_admin_routes, category_routes};
pub use dish_handler::{dish_admin_routes, dish_routes};
pub use order_handler::{admin_order_routes, cart_routes, order_routes};
pub use payment_handler::payment_routes;
pub use report_handler::report_routes;
pub use review_handler::{review_member_routes, review_routes};
pub use user_handler::{admin_user_routes, user_routes};

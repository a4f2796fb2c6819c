//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    auth_handler, category_handler, dish_handler, order_handler, payment_handler, report_handler,
    review_handler, user_handler,
};
use crate::domain::{
    CartLine, CartQuote, Category, CrustBase, DailyRevenue, Dish, DishSize, DishStatus, Order,
    OrderItem, OrderStatus, OrderType, PaymentMethod, PaymentStatus, PricedLine, RevenueReport,
    Review, TransactionStatus, UserResponse, UserRole, UserTransaction,
};
use crate::services::{QuickOrderReceipt, TokenResponse};
use crate::types::PaginationMeta;

/// OpenAPI documentation for the Order Eat API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Order Eat API",
        version = "0.1.0",
        description = "Food ordering backend: catalog, cart pricing, orders, payments and reviews",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
        contact(name = "Order Eat Team", email = "dev@ordereat.vn")
    ),
    servers(
        (url = "/api/v1", description = "Versioned API root")
    ),
    paths(
        // Authentication
        auth_handler::register,
        auth_handler::login,
        auth_handler::refresh,
        auth_handler::logout,
        // Users
        user_handler::get_current_user,
        user_handler::update_current_user,
        user_handler::change_password,
        user_handler::list_users,
        user_handler::get_user,
        user_handler::update_user,
        user_handler::delete_user,
        user_handler::restore_user,
        // Catalog
        category_handler::list_categories,
        category_handler::get_category,
        category_handler::create_category,
        category_handler::update_category,
        category_handler::delete_category,
        dish_handler::list_dishes,
        dish_handler::get_dish,
        dish_handler::create_dish,
        dish_handler::update_dish,
        dish_handler::delete_dish,
        // Orders
        order_handler::quote_cart,
        order_handler::create_order,
        order_handler::list_orders,
        order_handler::get_order,
        order_handler::update_order_status,
        order_handler::cancel_order,
        order_handler::delete_order,
        order_handler::quick_order,
        // Payments
        payment_handler::create_payment,
        payment_handler::payment_status,
        payment_handler::confirm_payment,
        payment_handler::list_payments,
        // Reviews
        review_handler::list_reviews,
        review_handler::get_review,
        review_handler::create_review,
        review_handler::update_review,
        review_handler::reply_review,
        review_handler::delete_review,
        // Reports
        report_handler::revenue_report,
    ),
    components(
        schemas(
            // Domain types
            UserRole,
            UserResponse,
            Category,
            Dish,
            DishStatus,
            DishSize,
            CrustBase,
            CartLine,
            PricedLine,
            CartQuote,
            Order,
            OrderItem,
            OrderStatus,
            OrderType,
            PaymentMethod,
            TransactionStatus,
            UserTransaction,
            PaymentStatus,
            Review,
            DailyRevenue,
            RevenueReport,
            PaginationMeta,
            // Service types
            TokenResponse,
            QuickOrderReceipt,
            // Request bodies
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            auth_handler::RefreshTokenRequest,
            user_handler::UpdateProfileRequest,
            user_handler::ChangePasswordRequest,
            user_handler::UpdateUserRequest,
            category_handler::CreateCategoryRequest,
            category_handler::UpdateCategoryRequest,
            dish_handler::CreateDishRequest,
            dish_handler::UpdateDishRequest,
            order_handler::CartQuoteRequest,
            order_handler::CreateOrderRequest,
            order_handler::UpdateOrderStatusRequest,
            order_handler::QuickOrderRequest,
            payment_handler::CreatePaymentRequest,
            payment_handler::ConfirmPaymentRequest,
            review_handler::CreateReviewRequest,
            review_handler::UpdateReviewRequest,
            review_handler::ReplyReviewRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and token refresh"),
        (name = "Users", description = "Profiles and account administration"),
        (name = "Categories", description = "Menu categories"),
        (name = "Dishes", description = "Menu items"),
        (name = "Orders", description = "Cart pricing and order lifecycle"),
        (name = "Payments", description = "Payment creation, polling and settlement"),
        (name = "Reviews", description = "Ratings on completed orders"),
        (name = "Admin", description = "Back-office reports")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token obtained from /auth/login"))
                        .build(),
                ),
            );
        }
    }
}

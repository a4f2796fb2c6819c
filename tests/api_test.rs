//! Integration tests for API endpoints.
//!
//! The router runs against hand-written stub services, an in-process cache
//! and a disconnected database, so no PostgreSQL or Redis is needed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{NaiveDate, Utc};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use order_eat::api::{create_router, AppState};
use order_eat::config::Config;
use order_eat::domain::{
    Actor, CartLine, CartQuote, Category, CategoryChanges, DateRange, Dish, DishChanges, DishFilter,
    DishStatus, NewDish, Order, OrderFilter, OrderStatus, PaymentMethod, PaymentStatus,
    RevenueReport, Review, ReviewFilter, User, UserChanges, UserFilter, UserResponse, UserRole,
    UserTransaction,
};
use order_eat::errors::{AppError, AppResult};
use order_eat::infra::{CacheStore, Database, DistributedLock};
use order_eat::services::{
    AuthService, CategoryService, Claims, DishService, OrderService, PaymentService, PlaceOrder,
    QuickOrder, QuickOrderReceipt, Registration, ReportService, ReviewService, ServiceContainer,
    TokenResponse, UserService,
};
use order_eat::types::{Paginated, PaginationParams};

const CUSTOMER_TOKEN: &str = "customer-token";
const ADMIN_TOKEN: &str = "admin-token";

fn not_stubbed<T>() -> AppResult<T> {
    Err(AppError::internal("not stubbed"))
}

// =============================================================================
// Stub Services
// =============================================================================

struct StubAuthService {
    customer_id: Uuid,
    admin_id: Uuid,
}

#[async_trait]
impl AuthService for StubAuthService {
    async fn register(&self, registration: Registration) -> AppResult<User> {
        Ok(User {
            id: Uuid::new_v4(),
            email: registration.email,
            password_hash: "hashed".to_string(),
            name: registration.name,
            phone: registration.phone,
            address: registration.address,
            role: UserRole::User,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        })
    }

    async fn login(&self, _email: String, _password: String) -> AppResult<TokenResponse> {
        Err(AppError::InvalidCredentials)
    }

    async fn refresh(&self, _refresh_token: String) -> AppResult<TokenResponse> {
        Err(AppError::Unauthorized)
    }

    async fn logout(&self, _refresh_token: String) -> AppResult<()> {
        Ok(())
    }

    async fn change_password(&self, _: Uuid, _: String, _: String) -> AppResult<()> {
        not_stubbed()
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let (sub, role) = match token {
            CUSTOMER_TOKEN => (self.customer_id, "user"),
            ADMIN_TOKEN => (self.admin_id, "admin"),
            _ => return Err(AppError::Unauthorized),
        };

        Ok(Claims {
            sub,
            email: format!("{}@ordereat.vn", role),
            role: role.to_string(),
            exp: Utc::now().timestamp() + 3600,
            iat: Utc::now().timestamp(),
        })
    }
}

struct StubUserService;

#[async_trait]
impl UserService for StubUserService {
    async fn get_user(&self, _: Uuid) -> AppResult<User> {
        not_stubbed()
    }

    async fn get_profile(&self, _: Uuid) -> AppResult<UserResponse> {
        not_stubbed()
    }

    async fn update_profile(&self, _: Uuid, _: UserChanges) -> AppResult<User> {
        not_stubbed()
    }

    async fn list_users(&self, _: UserFilter, _: PaginationParams) -> AppResult<Paginated<User>> {
        not_stubbed()
    }

    async fn get_user_with_deleted(&self, _: Uuid) -> AppResult<User> {
        not_stubbed()
    }

    async fn update_user(&self, _: Uuid, _: UserChanges) -> AppResult<User> {
        not_stubbed()
    }

    async fn delete_user(&self, _: Actor, _: Uuid) -> AppResult<()> {
        not_stubbed()
    }

    async fn restore_user(&self, _: Uuid) -> AppResult<User> {
        not_stubbed()
    }
}

fn category(name: &str) -> Category {
    Category {
        id: Uuid::new_v4(),
        name: name.to_string(),
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

struct StubCategoryService;

#[async_trait]
impl CategoryService for StubCategoryService {
    async fn list_categories(&self, _: Option<bool>) -> AppResult<Vec<Category>> {
        Ok(vec![category("Mì Ý"), category("Pizza")])
    }

    async fn get_category(&self, _: Uuid) -> AppResult<Category> {
        Err(AppError::NotFound("Category"))
    }

    async fn create_category(&self, name: String, _: bool) -> AppResult<Category> {
        Ok(category(&name))
    }

    async fn update_category(&self, _: Uuid, _: CategoryChanges) -> AppResult<Category> {
        not_stubbed()
    }

    async fn delete_category(&self, _: Uuid) -> AppResult<()> {
        Err(AppError::conflict("Category still has 3 dish(es)"))
    }
}

struct StubDishService;

#[async_trait]
impl DishService for StubDishService {
    async fn list_dishes(&self, _: DishFilter, params: PaginationParams) -> AppResult<Paginated<Dish>> {
        let dish = Dish {
            id: Uuid::new_v4(),
            name: "Pizza Hải Sản".to_string(),
            description: None,
            base_price: 159_000,
            status: DishStatus::Available,
            category_id: Uuid::new_v4(),
            size: None,
            type_name: Some("pizza".to_string()),
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        Ok(Paginated::new(vec![dish], &params, 12))
    }

    async fn get_dish(&self, _: Uuid) -> AppResult<Dish> {
        not_stubbed()
    }

    async fn create_dish(&self, _: NewDish) -> AppResult<Dish> {
        not_stubbed()
    }

    async fn update_dish(&self, _: Uuid, _: DishChanges) -> AppResult<Dish> {
        not_stubbed()
    }

    async fn delete_dish(&self, _: Uuid) -> AppResult<()> {
        not_stubbed()
    }
}

/// Records the actor of the last order listing
#[derive(Default)]
struct StubOrderService {
    listed_by: Mutex<Option<Actor>>,
}

#[async_trait]
impl OrderService for StubOrderService {
    async fn quote(&self, _: Vec<CartLine>) -> AppResult<CartQuote> {
        not_stubbed()
    }

    async fn create_order(&self, _: Actor, _: PlaceOrder) -> AppResult<Order> {
        not_stubbed()
    }

    async fn list_orders(
        &self,
        actor: Actor,
        _: OrderFilter,
        params: PaginationParams,
    ) -> AppResult<Paginated<Order>> {
        *self.listed_by.lock().unwrap() = Some(actor);
        Ok(Paginated::new(vec![], &params, 0))
    }

    async fn get_order(&self, _: Actor, _: Uuid) -> AppResult<Order> {
        Err(AppError::Forbidden)
    }

    async fn update_status(&self, _: Uuid, _: OrderStatus) -> AppResult<Order> {
        not_stubbed()
    }

    async fn cancel_order(&self, _: Actor, _: Uuid) -> AppResult<Order> {
        not_stubbed()
    }

    async fn delete_order(&self, _: Uuid) -> AppResult<()> {
        not_stubbed()
    }

    async fn quick_order(&self, _: Actor, _: QuickOrder) -> AppResult<QuickOrderReceipt> {
        not_stubbed()
    }
}

struct StubReviewService;

#[async_trait]
impl ReviewService for StubReviewService {
    async fn create_review(&self, _: Actor, _: Uuid, _: i16, _: Option<String>) -> AppResult<Review> {
        not_stubbed()
    }

    async fn list_reviews(&self, _: ReviewFilter, params: PaginationParams) -> AppResult<Paginated<Review>> {
        Ok(Paginated::new(vec![], &params, 0))
    }

    async fn get_review(&self, _: Uuid) -> AppResult<Review> {
        not_stubbed()
    }

    async fn update_review(
        &self,
        _: Actor,
        _: Uuid,
        _: Option<i16>,
        _: Option<String>,
    ) -> AppResult<Review> {
        not_stubbed()
    }

    async fn reply_to_review(&self, _: Uuid, _: String) -> AppResult<Review> {
        not_stubbed()
    }

    async fn delete_review(&self, _: Actor, _: Uuid) -> AppResult<()> {
        not_stubbed()
    }
}

struct StubPaymentService;

#[async_trait]
impl PaymentService for StubPaymentService {
    async fn create_payment(&self, _: Actor, _: Uuid, _: PaymentMethod) -> AppResult<UserTransaction> {
        not_stubbed()
    }

    async fn payment_status(&self, _: Actor, _: Uuid) -> AppResult<PaymentStatus> {
        Err(AppError::NotFound("Payment"))
    }

    async fn confirm_payment(&self, _: Uuid, _: bool) -> AppResult<UserTransaction> {
        Err(AppError::conflict("Order has already been paid"))
    }

    async fn list_payments(
        &self,
        _: Option<Uuid>,
        _: PaginationParams,
    ) -> AppResult<Paginated<UserTransaction>> {
        not_stubbed()
    }
}

struct StubReportService;

#[async_trait]
impl ReportService for StubReportService {
    async fn revenue_report(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<RevenueReport> {
        let today = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        DateRange::resolve(from, to, today)?;
        not_stubbed()
    }
}

struct StubContainer {
    auth: Arc<StubAuthService>,
    orders: Arc<StubOrderService>,
}

impl ServiceContainer for StubContainer {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        Arc::new(StubUserService)
    }

    fn categories(&self) -> Arc<dyn CategoryService> {
        Arc::new(StubCategoryService)
    }

    fn dishes(&self) -> Arc<dyn DishService> {
        Arc::new(StubDishService)
    }

    fn orders(&self) -> Arc<dyn OrderService> {
        self.orders.clone()
    }

    fn reviews(&self) -> Arc<dyn ReviewService> {
        Arc::new(StubReviewService)
    }

    fn payments(&self) -> Arc<dyn PaymentService> {
        Arc::new(StubPaymentService)
    }

    fn reports(&self) -> Arc<dyn ReportService> {
        Arc::new(StubReportService)
    }
}

// =============================================================================
// In-process Cache
// =============================================================================

#[derive(Default)]
struct MemoryCache {
    counters: Mutex<HashMap<String, u64>>,
}

struct NoopLock;

#[async_trait]
impl DistributedLock for NoopLock {
    async fn release(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get_user(&self, _: Uuid) -> AppResult<Option<UserResponse>> {
        Ok(None)
    }

    async fn set_user(&self, _: &UserResponse) -> AppResult<()> {
        Ok(())
    }

    async fn invalidate_user(&self, _: Uuid) -> AppResult<()> {
        Ok(())
    }

    async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        _window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        let mut counters = self.counters.lock().unwrap();
        let count = counters.entry(identifier.to_string()).or_insert(0);
        *count += 1;
        Ok((*count, *count <= max_requests))
    }

    async fn store_refresh_token(&self, _: &str, _: Uuid, _: u64) -> AppResult<()> {
        Ok(())
    }

    async fn take_refresh_token(&self, _: &str) -> AppResult<Option<Uuid>> {
        Ok(None)
    }

    async fn revoke_refresh_token(&self, _: &str) -> AppResult<()> {
        Ok(())
    }

    async fn acquire_lock(&self, _: &str) -> AppResult<Box<dyn DistributedLock>> {
        Ok(Box::new(NoopLock))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

struct TestApp {
    router: Router,
    customer_id: Uuid,
    orders: Arc<StubOrderService>,
}

fn test_app() -> TestApp {
    let customer_id = Uuid::new_v4();
    let orders = Arc::new(StubOrderService::default());
    let container = StubContainer {
        auth: Arc::new(StubAuthService {
            customer_id,
            admin_id: Uuid::new_v4(),
        }),
        orders: orders.clone(),
    };

    let state = AppState::new(
        &container,
        Arc::new(MemoryCache::default()),
        Arc::new(Database::from_connection(DatabaseConnection::Disconnected)),
    );
    let config = Config::with_secret("test-secret-key-for-testing-only-32chars");

    TestApp {
        router: create_router(state, &config),
        customer_id,
        orders,
    }
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("X-Forwarded-For", "203.0.113.7");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, value)
}

// =============================================================================
// Health & Docs
// =============================================================================

#[tokio::test]
async fn test_root_endpoint() {
    let app = test_app();
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    assert_eq!(&bytes[..], b"Order Eat API");
}

#[tokio::test]
async fn test_health_reports_disconnected_database() {
    let app = test_app();

    let (status, body) = send(&app.router, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["services"]["database"]["status"], "unhealthy");
    assert_eq!(body["services"]["redis"]["status"], "healthy");
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = test_app();

    let (status, body) = send(&app.router, Method::GET, "/api-docs/openapi.json", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "Order Eat API");
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_categories_are_public() {
    let app = test_app();

    let (status, body) = send(&app.router, Method::GET, "/api/v1/categories", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["statusCode"], 200);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_create_category_requires_token() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/v1/categories",
        None,
        Some(json!({ "name": "Đồ uống" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_create_category_requires_admin() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/v1/categories",
        Some(CUSTOMER_TOKEN),
        Some(json!({ "name": "Đồ uống" })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_admin_creates_category() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/v1/categories",
        Some(ADMIN_TOKEN),
        Some(json!({ "name": "Đồ uống" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["statusCode"], 201);
    assert_eq!(body["data"]["name"], "Đồ uống");
}

#[tokio::test]
async fn test_delete_category_with_dishes_conflicts() {
    let app = test_app();
    let uri = format!("/api/v1/categories/{}", Uuid::new_v4());

    let (status, body) = send(&app.router, Method::DELETE, &uri, Some(ADMIN_TOKEN), None).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Category still has 3 dish(es)");
}

#[tokio::test]
async fn test_dish_listing_carries_pagination_meta() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        Method::GET,
        "/api/v1/dishes?page=2&limit=5",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["page"], 2);
    assert_eq!(body["meta"]["perPage"], 5);
    assert_eq!(body["meta"]["total"], 12);
    assert_eq!(body["meta"]["totalPages"], 3);
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_register_rejects_bad_phone() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({
            "email": "khach@ordereat.vn",
            "password": "matkhau123",
            "name": "Khách",
            "phone": "12345"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_register_returns_created_user_without_hash() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({
            "email": "khach@ordereat.vn",
            "password": "matkhau123",
            "name": "Khách",
            "phone": "0901234567"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["email"], "khach@ordereat.vn");
    assert!(body["data"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_empty_cart_quote_rejected() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/v1/cart/quote",
        None,
        Some(json!({ "items": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_report_rejects_inverted_range() {
    let app = test_app();

    let (status, _) = send(
        &app.router,
        Method::GET,
        "/api/v1/admin/reports/revenue?from=2026-03-31&to=2026-03-01",
        Some(ADMIN_TOKEN),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_report_rejects_unbounded_ranges() {
    let app = test_app();

    for uri in [
        "/api/v1/admin/reports/revenue?from=0001-01-01&to=9999-12-31",
        "/api/v1/admin/reports/revenue?to=%2B262142-12-31",
        "/api/v1/admin/reports/revenue?to=-262143-01-01",
    ] {
        let (status, body) = send(&app.router, Method::GET, uri, Some(ADMIN_TOKEN), None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"], "VALIDATION_ERROR", "{}", uri);
    }
}

// =============================================================================
// Payments
// =============================================================================

#[tokio::test]
async fn test_payment_requires_token() {
    let app = test_app();

    let (status, _) = send(
        &app.router,
        Method::POST,
        "/api/v1/payments",
        None,
        Some(json!({ "orderId": Uuid::new_v4(), "method": "zalopay" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_customer_cannot_confirm_payment() {
    let app = test_app();
    let uri = format!("/api/v1/payments/{}/confirm", Uuid::new_v4());

    let (status, body) = send(
        &app.router,
        Method::POST,
        &uri,
        Some(CUSTOMER_TOKEN),
        Some(json!({ "success": true })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_double_settlement_is_conflict() {
    let app = test_app();
    let uri = format!("/api/v1/payments/{}/confirm", Uuid::new_v4());

    let (status, body) = send(
        &app.router,
        Method::POST,
        &uri,
        Some(ADMIN_TOKEN),
        Some(json!({ "success": true })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["statusCode"], 409);
    assert_eq!(body["message"], "Order has already been paid");
}

#[tokio::test]
async fn test_unknown_payment_status_is_not_found() {
    let app = test_app();
    let uri = format!("/api/v1/payments/{}/status", Uuid::new_v4());

    let (status, body) = send(&app.router, Method::GET, &uri, Some(CUSTOMER_TOKEN), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Payment not found");
}

// =============================================================================
// Authorization
// =============================================================================

#[tokio::test]
async fn test_orders_require_token() {
    let app = test_app();

    let (status, _) = send(&app.router, Method::GET, "/api/v1/orders", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_order_listing_passes_caller() {
    let app = test_app();

    let (status, _) = send(
        &app.router,
        Method::GET,
        "/api/v1/orders?status=pending",
        Some(CUSTOMER_TOKEN),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let actor = (*app.orders.listed_by.lock().unwrap()).expect("orders listed");
    assert_eq!(actor.id, app.customer_id);
    assert_eq!(actor.role, UserRole::User);
}

#[tokio::test]
async fn test_reviews_are_public_but_reply_is_admin_only() {
    let app = test_app();

    let (status, _) = send(&app.router, Method::GET, "/api/v1/reviews", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let uri = format!("/api/v1/reviews/{}/reply", Uuid::new_v4());
    let (status, _) = send(
        &app.router,
        Method::PATCH,
        &uri,
        Some(CUSTOMER_TOKEN),
        Some(json!({ "adminReply": "Cảm ơn bạn!" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_routes_reject_customers() {
    let app = test_app();

    let (status, _) = send(
        &app.router,
        Method::GET,
        "/api/v1/admin/users",
        Some(CUSTOMER_TOKEN),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let app = test_app();
    let uri = format!("/api/v1/payments/{}/status", Uuid::new_v4());

    let (status, _) = send(&app.router, Method::GET, &uri, Some("forged"), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Rate Limiting
// =============================================================================

#[tokio::test]
async fn test_auth_endpoints_are_rate_limited() {
    let app = test_app();
    let credentials = json!({ "email": "khach@ordereat.vn", "password": "matkhau123" });

    for _ in 0..10 {
        let (status, _) = send(
            &app.router,
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(credentials.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(credentials),
    )
    .await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "RATE_LIMITED");
}

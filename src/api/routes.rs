//! Application route configuration.

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware,
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    admin_order_routes, admin_user_routes, auth_routes, cart_routes, category_admin_routes,
    category_routes, dish_admin_routes, dish_routes, order_routes, payment_routes, report_routes,
    review_member_routes, review_routes, user_routes,
};
use super::middleware::{auth_middleware, rate_limit_auth_middleware, rate_limit_middleware};
use super::openapi::ApiDoc;
use super::AppState;
use crate::config::{Config, API_PREFIX};

/// Create the application router with all routes configured
pub fn create_router(state: AppState, config: &Config) -> Router {
    let auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    // Catalog reads are public; writes on the same prefix need a token
    let resources = Router::new()
        .nest("/users", user_routes().route_layer(auth.clone()))
        .nest(
            "/categories",
            category_routes().merge(category_admin_routes().route_layer(auth.clone())),
        )
        .nest(
            "/dishes",
            dish_routes().merge(dish_admin_routes().route_layer(auth.clone())),
        )
        .nest("/cart", cart_routes())
        .nest("/orders", order_routes().route_layer(auth.clone()))
        .nest(
            "/reviews",
            review_routes().merge(review_member_routes().route_layer(auth.clone())),
        )
        .nest("/payments", payment_routes().route_layer(auth.clone()))
        .nest(
            "/admin",
            Router::new()
                .nest("/users", admin_user_routes())
                .nest("/orders", admin_order_routes())
                .nest("/reports", report_routes())
                .route_layer(auth),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    let api = Router::new()
        // Stricter limit on credential endpoints
        .nest(
            "/auth",
            auth_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit_auth_middleware,
            )),
        )
        .merge(resources);

    Router::new()
        // Health check endpoints (no rate limiting)
        .route("/", get(root))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest(API_PREFIX, api)
        // Global middleware
        .layer(cors_layer(&config.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Allow the configured origins, or any origin when none are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Root endpoint
async fn root() -> &'static str {
    "Order Eat API"
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    services: ServiceHealth,
}

/// Individual service health status
#[derive(Serialize)]
struct ServiceHealth {
    database: ServiceStatus,
    redis: ServiceStatus,
}

/// Service status
#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ServiceStatus {
    fn from_result<E: ToString>(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self {
                status: "healthy",
                error: None,
            },
            Err(e) => Self {
                status: "unhealthy",
                error: Some(e.to_string()),
            },
        }
    }

    fn is_healthy(&self) -> bool {
        self.error.is_none()
    }
}

/// Health check endpoint with database and Redis connectivity check
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = ServiceStatus::from_result(state.database.ping().await);
    let redis = ServiceStatus::from_result(state.cache.ping().await);

    let all_healthy = database.is_healthy() && redis.is_healthy();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" },
        services: ServiceHealth { database, redis },
    };

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}

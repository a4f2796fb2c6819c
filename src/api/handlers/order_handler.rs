//! Order handlers: cart quotes, checkout, lifecycle and quick orders.

use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{CartLine, CartQuote, Order, OrderFilter, OrderStatus, OrderType, PaymentMethod};
use crate::errors::AppResult;
use crate::services::{PlaceOrder, QuickOrder, QuickOrderReceipt};
use crate::types::{ApiResponse, Created, NoContent, PaginationParams};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CartQuoteRequest {
    #[validate(
        length(min = 1, max = 50, message = "Cart must contain between 1 and 50 items"),
        nested
    )]
    pub items: Vec<CartLine>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(
        length(min = 1, max = 50, message = "Cart must contain between 1 and 50 items"),
        nested
    )]
    pub items: Vec<CartLine>,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    /// Required for delivery unless the profile has an address
    #[validate(length(max = 255, message = "Address is too long"))]
    pub delivery_address: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuickOrderRequest {
    #[validate(
        length(min = 1, max = 50, message = "Cart must contain between 1 and 50 items"),
        nested
    )]
    pub items: Vec<CartLine>,
    /// Defaults to the admin placing the order
    pub customer_id: Option<Uuid>,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OrderQuery {
    /// Ignored for non-admins
    pub user_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
    #[serde(rename = "type")]
    pub order_type: Option<OrderType>,
}

/// Public `/cart` routes
pub fn cart_routes() -> Router<AppState> {
    Router::new().route("/quote", post(quote_cart))
}

/// Authenticated `/orders` routes
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order).get(list_orders))
        .route("/:id", get(get_order).delete(delete_order))
        .route("/:id/status", patch(update_order_status))
        .route("/:id/cancel", post(cancel_order))
}

/// Authenticated `/admin/orders` routes
pub fn admin_order_routes() -> Router<AppState> {
    Router::new().route("/quick", post(quick_order))
}

/// Price a cart against current dish prices
#[utoipa::path(
    post,
    path = "/cart/quote",
    tag = "Orders",
    request_body = CartQuoteRequest,
    responses(
        (status = 200, description = "Priced cart", body = CartQuote),
        (status = 400, description = "Invalid quantity or unavailable dish"),
        (status = 404, description = "Unknown dish")
    )
)]
pub async fn quote_cart(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CartQuoteRequest>,
) -> AppResult<ApiResponse<CartQuote>> {
    let quote = state.order_service.quote(payload.items).await?;
    Ok(ApiResponse::success(quote))
}

#[utoipa::path(
    post,
    path = "/orders",
    tag = "Orders",
    security(("bearer_auth" = [])),
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = Order),
        (status = 400, description = "Invalid cart or missing delivery address"),
        (status = 404, description = "Unknown dish")
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateOrderRequest>,
) -> AppResult<Created<Order>> {
    let order = state
        .order_service
        .create_order(
            user.actor(),
            PlaceOrder {
                items: payload.items,
                order_type: payload.order_type,
                delivery_address: payload.delivery_address,
            },
        )
        .await?;
    Ok(Created(order))
}

#[utoipa::path(
    get,
    path = "/orders",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(PaginationParams, OrderQuery),
    responses((status = 200, description = "Page of orders, newest first", body = [Order]))
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<PaginationParams>,
    Query(query): Query<OrderQuery>,
) -> AppResult<ApiResponse<Vec<Order>>> {
    let filter = OrderFilter {
        user_id: query.user_id,
        status: query.status,
        order_type: query.order_type,
    };
    let page = state
        .order_service
        .list_orders(user.actor(), filter, params)
        .await?;
    Ok(page.into())
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order", body = Order),
        (status = 403, description = "Not your order"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<Order>> {
    let order = state.order_service.get_order(user.actor(), id).await?;
    Ok(ApiResponse::success(order))
}

#[utoipa::path(
    patch,
    path = "/orders/{id}/status",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = Order),
        (status = 400, description = "Transition not allowed")
    )
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateOrderStatusRequest>,
) -> AppResult<ApiResponse<Order>> {
    require_admin(&user)?;
    let order = state.order_service.update_status(id, payload.status).await?;
    Ok(ApiResponse::success(order))
}

#[utoipa::path(
    post,
    path = "/orders/{id}/cancel",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order cancelled", body = Order),
        (status = 400, description = "Order is no longer pending"),
        (status = 403, description = "Not your order")
    )
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<Order>> {
    let order = state.order_service.cancel_order(user.actor(), id).await?;
    Ok(ApiResponse::success(order))
}

#[utoipa::path(
    delete,
    path = "/orders/{id}",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn delete_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    require_admin(&user)?;
    state.order_service.delete_order(id).await?;
    Ok(NoContent)
}

/// In-store order with its payment (admin)
#[utoipa::path(
    post,
    path = "/admin/orders/quick",
    tag = "Admin",
    security(("bearer_auth" = [])),
    request_body = QuickOrderRequest,
    responses(
        (status = 201, description = "Order and payment created", body = QuickOrderReceipt),
        (status = 404, description = "Unknown customer or dish")
    )
)]
pub async fn quick_order(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<QuickOrderRequest>,
) -> AppResult<Created<QuickOrderReceipt>> {
    require_admin(&user)?;
    let receipt = state
        .order_service
        .quick_order(
            user.actor(),
            QuickOrder {
                items: payload.items,
                customer_id: payload.customer_id,
                payment_method: payload.payment_method,
            },
        )
        .await?;
    Ok(Created(receipt))
}

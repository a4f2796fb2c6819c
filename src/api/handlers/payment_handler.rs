//! Payment handlers: create, poll, confirm.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{PaymentMethod, PaymentStatus, UserTransaction};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, PaginationParams};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub order_id: Uuid,
    pub method: PaymentMethod,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ConfirmPaymentRequest {
    /// `false` marks the payment failed
    pub success: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PaymentQuery {
    pub order_id: Option<Uuid>,
}

pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_payment).get(list_payments))
        .route("/:id/status", get(payment_status))
        .route("/:id/confirm", post(confirm_payment))
}

#[utoipa::path(
    post,
    path = "/payments",
    tag = "Payments",
    security(("bearer_auth" = [])),
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment created; poll its status", body = UserTransaction),
        (status = 400, description = "Order is cancelled"),
        (status = 403, description = "Not your order"),
        (status = 409, description = "Order already paid or payment busy")
    )
)]
pub async fn create_payment(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreatePaymentRequest>,
) -> AppResult<Created<UserTransaction>> {
    let transaction = state
        .payment_service
        .create_payment(user.actor(), payload.order_id, payload.method)
        .await?;
    Ok(Created(transaction))
}

/// Polling endpoint for the checkout page
#[utoipa::path(
    get,
    path = "/payments/{id}/status",
    tag = "Payments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Current status", body = PaymentStatus),
        (status = 404, description = "Payment not found")
    )
)]
pub async fn payment_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<PaymentStatus>> {
    let status = state.payment_service.payment_status(user.actor(), id).await?;
    Ok(ApiResponse::success(status))
}

#[utoipa::path(
    post,
    path = "/payments/{id}/confirm",
    tag = "Payments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Transaction ID")),
    request_body = ConfirmPaymentRequest,
    responses(
        (status = 200, description = "Payment settled", body = UserTransaction),
        (status = 409, description = "Payment already settled")
    )
)]
pub async fn confirm_payment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ConfirmPaymentRequest>,
) -> AppResult<ApiResponse<UserTransaction>> {
    require_admin(&user)?;
    let transaction = state
        .payment_service
        .confirm_payment(id, payload.success)
        .await?;
    Ok(ApiResponse::success(transaction))
}

#[utoipa::path(
    get,
    path = "/payments",
    tag = "Payments",
    security(("bearer_auth" = [])),
    params(PaginationParams, PaymentQuery),
    responses((status = 200, description = "Page of transactions", body = [UserTransaction]))
)]
pub async fn list_payments(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<PaginationParams>,
    Query(query): Query<PaymentQuery>,
) -> AppResult<ApiResponse<Vec<UserTransaction>>> {
    require_admin(&user)?;
    let page = state
        .payment_service
        .list_payments(query.order_id, params)
        .await?;
    Ok(page.into())
}

//! Review handlers, including the admin reply workflow.

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
use crate::domain::{Review, ReviewFilter};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, NoContent, PaginationParams};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub order_id: Uuid,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    #[schema(example = 5, minimum = 1, maximum = 5)]
    pub rating: i16,
    #[validate(length(max = 1000, message = "Comment is too long"))]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateReviewRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i16>,
    #[validate(length(max = 1000, message = "Comment is too long"))]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplyReviewRequest {
    #[validate(length(min = 1, max = 1000, message = "Reply must be 1-1000 characters"))]
    #[schema(example = "Cảm ơn bạn đã ủng hộ!")]
    pub admin_reply: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReviewQuery {
    pub rating: Option<i16>,
    pub user_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
}

pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reviews))
        .route("/:id", get(get_review))
}

pub fn review_member_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_review))
        .route("/:id", patch(update_review).delete(delete_review))
        .route("/:id/reply", patch(reply_review))
}

#[utoipa::path(
    get,
    path = "/reviews",
    tag = "Reviews",
    params(PaginationParams, ReviewQuery),
    responses((status = 200, description = "Page of reviews", body = [Review]))
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
    Query(query): Query<ReviewQuery>,
) -> AppResult<ApiResponse<Vec<Review>>> {
    let filter = ReviewFilter {
        rating: query.rating,
        user_id: query.user_id,
        order_id: query.order_id,
    };
    let page = state.review_service.list_reviews(filter, params).await?;
    Ok(page.into())
}

#[utoipa::path(
    get,
    path = "/reviews/{id}",
    tag = "Reviews",
    params(("id" = Uuid, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review", body = Review),
        (status = 404, description = "Review not found")
    )
)]
pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<Review>> {
    let review = state.review_service.get_review(id).await?;
    Ok(ApiResponse::success(review))
}

#[utoipa::path(
    post,
    path = "/reviews",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 400, description = "Order is not completed or rating out of range"),
        (status = 403, description = "Not your order"),
        (status = 409, description = "Order already reviewed")
    )
)]
pub async fn create_review(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateReviewRequest>,
) -> AppResult<Created<Review>> {
    let review = state
        .review_service
        .create_review(user.actor(), payload.order_id, payload.rating, payload.comment)
        .await?;
    Ok(Created(review))
}

#[utoipa::path(
    patch,
    path = "/reviews/{id}",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Review ID")),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Review updated", body = Review),
        (status = 403, description = "Only the author may edit")
    )
)]
pub async fn update_review(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateReviewRequest>,
) -> AppResult<ApiResponse<Review>> {
    let review = state
        .review_service
        .update_review(user.actor(), id, payload.rating, payload.comment)
        .await?;
    Ok(ApiResponse::success(review))
}

/// Reply to a review as staff (admin)
#[utoipa::path(
    patch,
    path = "/reviews/{id}/reply",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Review ID")),
    request_body = ReplyReviewRequest,
    responses(
        (status = 200, description = "Reply saved", body = Review),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn reply_review(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ReplyReviewRequest>,
) -> AppResult<ApiResponse<Review>> {
    require_admin(&user)?;
    let review = state
        .review_service
        .reply_to_review(id, payload.admin_reply)
        .await?;
    Ok(ApiResponse::success(review))
}

#[utoipa::path(
    delete,
    path = "/reviews/{id}",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Review ID")),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 403, description = "Only the author or an admin may delete")
    )
)]
pub async fn delete_review(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.review_service.delete_review(user.actor(), id).await?;
    Ok(NoContent)
}

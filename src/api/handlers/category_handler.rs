//! Category handlers.

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
use crate::domain::{Category, CategoryChanges};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, NoContent};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    #[schema(example = "Pizza")]
    pub name: String,
    /// Defaults to true
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CategoryQuery {
    pub is_active: Option<bool>,
}

/// Public reads
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/:id", get(get_category))
}

/// Admin writes; mounted on the same prefix behind auth
pub fn category_admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_category))
        .route("/:id", patch(update_category).delete(delete_category))
}

#[utoipa::path(
    get,
    path = "/categories",
    tag = "Categories",
    params(CategoryQuery),
    responses((status = 200, description = "Categories ordered by name", body = [Category]))
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> AppResult<ApiResponse<Vec<Category>>> {
    let categories = state.category_service.list_categories(query.is_active).await?;
    Ok(ApiResponse::success(categories))
}

#[utoipa::path(
    get,
    path = "/categories/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category", body = Category),
        (status = 404, description = "Category not found")
    )
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<Category>> {
    let category = state.category_service.get_category(id).await?;
    Ok(ApiResponse::success(category))
}

#[utoipa::path(
    post,
    path = "/categories",
    tag = "Categories",
    security(("bearer_auth" = [])),
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 409, description = "Name already taken")
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateCategoryRequest>,
) -> AppResult<Created<Category>> {
    require_admin(&user)?;
    let category = state
        .category_service
        .create_category(payload.name, payload.is_active.unwrap_or(true))
        .await?;
    Ok(Created(category))
}

#[utoipa::path(
    patch,
    path = "/categories/{id}",
    tag = "Categories",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 409, description = "Name already taken")
    )
)]
pub async fn update_category(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateCategoryRequest>,
) -> AppResult<ApiResponse<Category>> {
    require_admin(&user)?;
    let changes = CategoryChanges {
        name: payload.name,
        is_active: payload.is_active,
    };
    let category = state.category_service.update_category(id, changes).await?;
    Ok(ApiResponse::success(category))
}

#[utoipa::path(
    delete,
    path = "/categories/{id}",
    tag = "Categories",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 409, description = "Category still has dishes")
    )
)]
pub async fn delete_category(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    require_admin(&user)?;
    state.category_service.delete_category(id).await?;
    Ok(NoContent)
}

//! Dish (menu) handlers.

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
use crate::domain::{Dish, DishChanges, DishFilter, DishStatus, NewDish};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, NoContent, PaginationParams};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDishRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    #[schema(example = "Pizza Hải Sản")]
    pub name: String,
    #[validate(length(max = 1000, message = "Description is too long"))]
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Base price must not be negative"))]
    #[schema(example = 159000)]
    pub base_price: i64,
    /// Defaults to available
    pub status: Option<DishStatus>,
    pub category_id: Uuid,
    #[validate(length(max = 50))]
    pub size: Option<String>,
    #[validate(length(max = 50))]
    pub type_name: Option<String>,
    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDishRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 1000, message = "Description is too long"))]
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Base price must not be negative"))]
    pub base_price: Option<i64>,
    pub status: Option<DishStatus>,
    pub category_id: Option<Uuid>,
    #[validate(length(max = 50))]
    pub size: Option<String>,
    #[validate(length(max = 50))]
    pub type_name: Option<String>,
    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DishQuery {
    pub category_id: Option<Uuid>,
    pub status: Option<DishStatus>,
    /// Matches the dish name
    pub search: Option<String>,
}

pub fn dish_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_dishes))
        .route("/:id", get(get_dish))
}

pub fn dish_admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_dish))
        .route("/:id", patch(update_dish).delete(delete_dish))
}

#[utoipa::path(
    get,
    path = "/dishes",
    tag = "Dishes",
    params(PaginationParams, DishQuery),
    responses((status = 200, description = "Page of dishes", body = [Dish]))
)]
pub async fn list_dishes(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
    Query(query): Query<DishQuery>,
) -> AppResult<ApiResponse<Vec<Dish>>> {
    let filter = DishFilter {
        category_id: query.category_id,
        status: query.status,
        search: query.search,
    };
    let page = state.dish_service.list_dishes(filter, params).await?;
    Ok(page.into())
}

#[utoipa::path(
    get,
    path = "/dishes/{id}",
    tag = "Dishes",
    params(("id" = Uuid, Path, description = "Dish ID")),
    responses(
        (status = 200, description = "Dish", body = Dish),
        (status = 404, description = "Dish not found")
    )
)]
pub async fn get_dish(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<Dish>> {
    let dish = state.dish_service.get_dish(id).await?;
    Ok(ApiResponse::success(dish))
}

#[utoipa::path(
    post,
    path = "/dishes",
    tag = "Dishes",
    security(("bearer_auth" = [])),
    request_body = CreateDishRequest,
    responses(
        (status = 201, description = "Dish created", body = Dish),
        (status = 400, description = "Validation error or unknown category")
    )
)]
pub async fn create_dish(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateDishRequest>,
) -> AppResult<Created<Dish>> {
    require_admin(&user)?;
    let dish = state
        .dish_service
        .create_dish(NewDish {
            name: payload.name,
            description: payload.description,
            base_price: payload.base_price,
            status: payload.status.unwrap_or(DishStatus::Available),
            category_id: payload.category_id,
            size: payload.size,
            type_name: payload.type_name,
            image_url: payload.image_url,
        })
        .await?;
    Ok(Created(dish))
}

#[utoipa::path(
    patch,
    path = "/dishes/{id}",
    tag = "Dishes",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Dish ID")),
    request_body = UpdateDishRequest,
    responses(
        (status = 200, description = "Dish updated", body = Dish),
        (status = 404, description = "Dish not found")
    )
)]
pub async fn update_dish(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateDishRequest>,
) -> AppResult<ApiResponse<Dish>> {
    require_admin(&user)?;
    let changes = DishChanges {
        name: payload.name,
        description: payload.description,
        base_price: payload.base_price,
        status: payload.status,
        category_id: payload.category_id,
        size: payload.size,
        type_name: payload.type_name,
        image_url: payload.image_url,
    };
    let dish = state.dish_service.update_dish(id, changes).await?;
    Ok(ApiResponse::success(dish))
}

#[utoipa::path(
    delete,
    path = "/dishes/{id}",
    tag = "Dishes",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Dish ID")),
    responses(
        (status = 204, description = "Dish deleted"),
        (status = 404, description = "Dish not found")
    )
)]
pub async fn delete_dish(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    require_admin(&user)?;
    state.dish_service.delete_dish(id).await?;
    Ok(NoContent)
}

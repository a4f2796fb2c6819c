//! User handlers: self-service profile and admin user management.

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
use crate::api::validation::{parse_role, validate_role, PHONE_REGEX};
use crate::api::AppState;
use crate::domain::{UserChanges, UserFilter, UserResponse, UserRole};
use crate::errors::AppResult;
use crate::types::{ApiResponse, NoContent, PaginationParams};

/// Self-service profile update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number"))]
    pub phone: Option<String>,
    #[validate(length(max = 255, message = "Address is too long"))]
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Admin update of any user
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number"))]
    pub phone: Option<String>,
    #[validate(length(max = 255, message = "Address is too long"))]
    pub address: Option<String>,
    #[validate(custom(function = "validate_role"))]
    #[schema(example = "admin")]
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    /// `user` or `admin`
    pub role: Option<String>,
    pub is_active: Option<bool>,
    /// Matches name or email
    pub search: Option<String>,
}

/// Routes under `/users` (authenticated)
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_current_user).patch(update_current_user))
        .route("/me/password", post(change_password))
}

/// Routes under `/admin/users` (authenticated, admin)
pub fn admin_user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user).patch(update_user).delete(delete_user))
        .route("/:id/restore", post(restore_user))
}

/// Current user's profile
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile", body = UserResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<ApiResponse<UserResponse>> {
    let profile = state.user_service.get_profile(user.id).await?;
    Ok(ApiResponse::success(profile))
}

#[utoipa::path(
    patch,
    path = "/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Validation error")
    )
)]
pub async fn update_current_user(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    let changes = UserChanges {
        name: payload.name,
        phone: payload.phone,
        address: payload.address,
        ..Default::default()
    };
    let updated = state.user_service.update_profile(user.id, changes).await?;
    Ok(ApiResponse::success(UserResponse::from(updated)))
}

#[utoipa::path(
    post,
    path = "/users/me/password",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Current password is incorrect")
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> AppResult<NoContent> {
    state
        .auth_service
        .change_password(user.id, payload.current_password, payload.new_password)
        .await?;
    Ok(NoContent)
}

/// List users, including soft-deleted ones (admin)
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(PaginationParams, UserListQuery),
    responses(
        (status = 200, description = "Page of users", body = [UserResponse]),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<PaginationParams>,
    Query(query): Query<UserListQuery>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    require_admin(&user)?;

    let filter = UserFilter {
        role: parse_role(query.role.as_deref())?,
        is_active: query.is_active,
        search: query.search,
    };
    let page = state.user_service.list_users(filter, params).await?;
    Ok(page.map(UserResponse::from).into())
}

#[utoipa::path(
    get,
    path = "/admin/users/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<UserResponse>> {
    require_admin(&user)?;
    let found = state.user_service.get_user_with_deleted(id).await?;
    Ok(ApiResponse::success(UserResponse::from(found)))
}

#[utoipa::path(
    patch,
    path = "/admin/users/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Validation error or unknown role"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    require_admin(&user)?;

    let changes = UserChanges {
        name: payload.name,
        phone: payload.phone,
        address: payload.address,
        role: payload.role.as_deref().map(UserRole::from),
        is_active: payload.is_active,
    };
    let updated = state.user_service.update_user(id, changes).await?;
    Ok(ApiResponse::success(UserResponse::from(updated)))
}

/// Soft delete a user (admin)
#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Admins cannot delete themselves"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    require_admin(&user)?;
    state.user_service.delete_user(user.actor(), id).await?;
    Ok(NoContent)
}

#[utoipa::path(
    post,
    path = "/admin/users/{id}/restore",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User restored", body = UserResponse),
        (status = 400, description = "User is not deleted")
    )
)]
pub async fn restore_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<UserResponse>> {
    require_admin(&user)?;
    let restored = state.user_service.restore_user(id).await?;
    Ok(ApiResponse::success(UserResponse::from(restored)))
}

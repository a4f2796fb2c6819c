//! Authentication handlers.

use axum::{extract::State, routing::post, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::validation::PHONE_REGEX;
use crate::api::AppState;
use crate::domain::UserResponse;
use crate::errors::AppResult;
use crate::services::{Registration, TokenResponse};
use crate::types::{ApiResponse, Created, NoContent};

/// User registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "khach@ordereat.vn")]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "MatKhau123!", min_length = 8)]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    #[schema(example = "Nguyễn Văn A")]
    pub name: String,
    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number"))]
    #[schema(example = "0901234567")]
    pub phone: Option<String>,
    #[validate(length(max = 255, message = "Address is too long"))]
    pub address: Option<String>,
}

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "khach@ordereat.vn")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "MatKhau123!")]
    pub password: String,
}

/// Body of refresh and logout
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
}

/// Register a new customer account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<Created<UserResponse>> {
    let user = state
        .auth_service
        .register(Registration {
            email: payload.email,
            password: payload.password,
            name: payload.name,
            phone: payload.phone,
            address: payload.address,
        })
        .await?;

    Ok(Created(UserResponse::from(user)))
}

/// Login and get a token pair
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials or disabled account")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<ApiResponse<TokenResponse>> {
    let token = state
        .auth_service
        .login(payload.email, payload.password)
        .await?;

    Ok(ApiResponse::success(token))
}

/// Exchange a refresh token for a new pair
#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "Authentication",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New token pair", body = TokenResponse),
        (status = 401, description = "Unknown, expired or already used refresh token")
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RefreshTokenRequest>,
) -> AppResult<ApiResponse<TokenResponse>> {
    let token = state.auth_service.refresh(payload.refresh_token).await?;
    Ok(ApiResponse::success(token))
}

/// Revoke a refresh token
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Authentication",
    request_body = RefreshTokenRequest,
    responses((status = 204, description = "Logged out"))
)]
pub async fn logout(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RefreshTokenRequest>,
) -> AppResult<NoContent> {
    state.auth_service.logout(payload.refresh_token).await?;
    Ok(NoContent)
}

//! Authentication service - registration, login and token lifecycle.
//!
//! Access tokens are short-lived JWTs; refresh tokens are opaque random
//! strings kept in Redis and rotated on every use.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, SECONDS_PER_DAY, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{NewUser, Password, User, UserResponse, UserRole};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{CacheStore, UnitOfWork};

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token pair returned after login or refresh
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Opaque token for `POST /auth/refresh`
    pub refresh_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Access token lifetime in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
    pub user: UserResponse,
}

/// Account details for a new user
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new customer account
    async fn register(&self, registration: Registration) -> AppResult<User>;

    /// Login and return a token pair
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// Exchange a refresh token for a new pair; the old token is consumed
    async fn refresh(&self, refresh_token: String) -> AppResult<TokenResponse>;

    /// Revoke a refresh token
    async fn logout(&self, refresh_token: String) -> AppResult<()>;

    async fn change_password(
        &self,
        user_id: Uuid,
        current_password: String,
        new_password: String,
    ) -> AppResult<()>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

/// Create an account with the given role.
///
/// Email uniqueness includes soft-deleted users so addresses are never reused.
pub async fn create_account<U: UnitOfWork>(
    uow: &U,
    registration: Registration,
    role: UserRole,
) -> AppResult<User> {
    let email = normalize_email(&registration.email);

    if uow.users().find_by_email_with_deleted(&email).await?.is_some() {
        return Err(AppError::conflict("Email is already registered"));
    }

    let password_hash = Password::new(&registration.password)?.into_string();

    let user = uow
        .users()
        .create(NewUser {
            email,
            password_hash,
            name: registration.name.trim().to_string(),
            phone: registration.phone,
            address: registration.address,
            role,
        })
        .await?;

    tracing::info!(user_id = %user.id, role = %user.role, "Account created");
    Ok(user)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// 256 bits of randomness, hex encoded
fn new_refresh_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

fn encode_access_token(user: &User, config: &Config) -> AppResult<String> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role.to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?)
}

fn decode_access_token(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    cache: Arc<dyn CacheStore>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, cache: Arc<dyn CacheStore>, config: Config) -> Self {
        Self { uow, cache, config }
    }

    async fn issue_tokens(&self, user: User) -> AppResult<TokenResponse> {
        let access_token = encode_access_token(&user, &self.config)?;
        let refresh_token = new_refresh_token();

        self.cache
            .store_refresh_token(
                &refresh_token,
                user.id,
                self.config.refresh_token_ttl_days * SECONDS_PER_DAY,
            )
            .await?;

        Ok(TokenResponse {
            access_token,
            refresh_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.config.jwt_expiration_hours * SECONDS_PER_HOUR,
            user: UserResponse::from(user),
        })
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, registration: Registration) -> AppResult<User> {
        create_account(self.uow.as_ref(), registration, UserRole::User).await
    }

    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let user = self.uow.users().find_by_email(&normalize_email(&email)).await?;

        // Verify against a dummy hash when the account is missing so both
        // paths take the same time
        let stored = match &user {
            Some(user) => Password::from_hash(user.password_hash.as_str()),
            None => Password::dummy(),
        };
        let password_valid = stored.verify(&password);

        let user = match user {
            Some(user) if password_valid => user,
            _ => return Err(AppError::InvalidCredentials),
        };

        if !user.can_sign_in() {
            tracing::info!(user_id = %user.id, "Login rejected for disabled account");
            return Err(AppError::AccountDisabled);
        }

        tracing::info!(user_id = %user.id, "User logged in");
        self.issue_tokens(user).await
    }

    async fn refresh(&self, refresh_token: String) -> AppResult<TokenResponse> {
        let user_id = self
            .cache
            .take_refresh_token(&refresh_token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let user = self
            .uow
            .users()
            .find_by_id(user_id)
            .await?
            .filter(User::can_sign_in)
            .ok_or(AppError::Unauthorized)?;

        self.issue_tokens(user).await
    }

    async fn logout(&self, refresh_token: String) -> AppResult<()> {
        self.cache.revoke_refresh_token(&refresh_token).await
    }

    async fn change_password(
        &self,
        user_id: Uuid,
        current_password: String,
        new_password: String,
    ) -> AppResult<()> {
        let user = self
            .uow
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or_not_found("User")?;

        if !Password::from_hash(user.password_hash).verify(&current_password) {
            return Err(AppError::bad_request("Current password is incorrect"));
        }

        let password_hash = Password::new(&new_password)?.into_string();
        self.uow.users().update_password(user_id, password_hash).await?;

        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        decode_access_token(token, &self.config)
    }
}

//! User service - profiles and admin account management.
//!
//! Profiles are cached in Redis; every write invalidates the entry.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Actor, User, UserChanges, UserFilter, UserResponse};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{CacheStore, UnitOfWork};
use crate::types::{Paginated, PaginationParams};

/// User service trait for dependency injection.
///
/// By default, operations exclude soft-deleted users.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get active user by ID (excludes soft-deleted)
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// Profile of the current user, served from cache when possible
    async fn get_profile(&self, id: Uuid) -> AppResult<UserResponse>;

    /// Self-service update; only name, phone and address are applied
    async fn update_profile(&self, id: Uuid, changes: UserChanges) -> AppResult<User>;

    /// Admin listing, including soft-deleted users
    async fn list_users(&self, filter: UserFilter, params: PaginationParams) -> AppResult<Paginated<User>>;

    /// Get user by ID including soft-deleted
    async fn get_user_with_deleted(&self, id: Uuid) -> AppResult<User>;

    /// Admin update, may also change role and active flag
    async fn update_user(&self, id: Uuid, changes: UserChanges) -> AppResult<User>;

    /// Soft delete; admins cannot delete themselves
    async fn delete_user(&self, actor: Actor, id: Uuid) -> AppResult<()>;

    /// Restore a soft-deleted user
    async fn restore_user(&self, id: Uuid) -> AppResult<User>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
    cache: Arc<dyn CacheStore>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>, cache: Arc<dyn CacheStore>) -> Self {
        Self { uow, cache }
    }

    /// Cache problems never fail a request
    async fn forget(&self, id: Uuid) {
        if let Err(e) = self.cache.invalidate_user(id).await {
            tracing::warn!(user_id = %id, error = %e, "Failed to invalidate cached user");
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.uow
            .users()
            .find_by_id(id)
            .await?
            .ok_or_not_found("User")
    }

    async fn get_profile(&self, id: Uuid) -> AppResult<UserResponse> {
        match self.cache.get_user(id).await {
            Ok(Some(cached)) => return Ok(cached),
            Ok(None) => {}
            Err(e) => tracing::warn!(user_id = %id, error = %e, "Profile cache read failed"),
        }

        let profile = UserResponse::from(self.get_user(id).await?);

        if let Err(e) = self.cache.set_user(&profile).await {
            tracing::warn!(user_id = %id, error = %e, "Profile cache write failed");
        }

        Ok(profile)
    }

    async fn update_profile(&self, id: Uuid, changes: UserChanges) -> AppResult<User> {
        let changes = UserChanges {
            role: None,
            is_active: None,
            ..changes
        };

        let user = self.uow.users().update(id, changes).await?;
        self.forget(id).await;
        Ok(user)
    }

    async fn list_users(&self, filter: UserFilter, params: PaginationParams) -> AppResult<Paginated<User>> {
        self.uow.users().list(filter, params).await
    }

    async fn get_user_with_deleted(&self, id: Uuid) -> AppResult<User> {
        self.uow
            .users()
            .find_by_id_with_deleted(id)
            .await?
            .ok_or_not_found("User")
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> AppResult<User> {
        if changes.is_empty() {
            return Err(AppError::validation("No fields to update"));
        }

        let user = self.uow.users().update(id, changes).await?;
        self.forget(id).await;
        Ok(user)
    }

    async fn delete_user(&self, actor: Actor, id: Uuid) -> AppResult<()> {
        if actor.id == id {
            return Err(AppError::bad_request("You cannot delete your own account"));
        }

        self.uow.users().delete(id).await?;
        self.forget(id).await;

        tracing::info!(user_id = %id, by = %actor.id, "User soft-deleted");
        Ok(())
    }

    async fn restore_user(&self, id: Uuid) -> AppResult<User> {
        let user = self.uow.users().restore(id).await?;
        self.forget(id).await;
        Ok(user)
    }
}

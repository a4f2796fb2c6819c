//! User repository implementation with soft delete support.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::base;
use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::{NewUser, User, UserChanges, UserFilter};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::types::{Paginated, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// By default, all query methods exclude soft-deleted records.
/// Use `*_with_deleted` variants to include them.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find active user by ID (excludes soft-deleted)
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by ID including soft-deleted
    async fn find_by_id_with_deleted(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find active user by email address (excludes soft-deleted)
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find user by email including soft-deleted
    async fn find_by_email_with_deleted(&self, email: &str) -> AppResult<Option<User>>;

    async fn create(&self, user: NewUser) -> AppResult<User>;

    /// Apply a partial update to an active user
    async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<User>;

    async fn update_password(&self, id: Uuid, password_hash: String) -> AppResult<()>;

    /// Soft delete user by ID (sets deleted_at timestamp)
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Restore a soft-deleted user
    async fn restore(&self, id: Uuid) -> AppResult<User>;

    /// Page through users, newest first. Soft-deleted users are included.
    async fn list(&self, filter: UserFilter, params: PaginationParams) -> AppResult<Paginated<User>>;
}

/// Concrete implementation of UserRepository with soft delete
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        find_active(&self.db, id).await
    }

    async fn find_by_id_with_deleted(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .filter(user::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn find_by_email_with_deleted(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        insert(&self.db, user).await
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<User> {
        let model = UserEntity::find_by_id(id)
            .filter(user::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or_not_found("User")?;

        let mut active: ActiveModel = model.into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(address) = changes.address {
            active.address = Set(Some(address));
        }
        if let Some(role) = changes.role {
            active.role = Set(role.as_str().to_string());
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Ok(User::from(model))
    }

    async fn update_password(&self, id: Uuid, password_hash: String) -> AppResult<()> {
        let model = UserEntity::find_by_id(id)
            .filter(user::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or_not_found("User")?;

        let mut active: ActiveModel = model.into();
        active.password_hash = Set(password_hash);
        active.updated_at = Set(chrono::Utc::now());

        active.update(&self.db).await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let model = UserEntity::find_by_id(id)
            .filter(user::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or_not_found("User")?;

        let mut active: ActiveModel = model.into();
        let now = chrono::Utc::now();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);

        active.update(&self.db).await?;
        Ok(())
    }

    async fn restore(&self, id: Uuid) -> AppResult<User> {
        let model = UserEntity::find_by_id(id)
            .filter(user::Column::DeletedAt.is_not_null())
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::bad_request("User is not deleted or does not exist"))?;

        let mut active: ActiveModel = model.into();
        active.deleted_at = Set(None);
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Ok(User::from(model))
    }

    async fn list(&self, filter: UserFilter, params: PaginationParams) -> AppResult<Paginated<User>> {
        let mut condition = Condition::all();

        if let Some(role) = filter.role {
            condition = condition.add(user::Column::Role.eq(role.as_str()));
        }
        if let Some(is_active) = filter.is_active {
            condition = condition.add(user::Column::IsActive.eq(is_active));
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            condition = condition.add(
                Condition::any()
                    .add(base::contains_ci(user::Column::Name, search))
                    .add(base::contains_ci(user::Column::Email, search)),
            );
        }

        let query = UserEntity::find()
            .filter(condition)
            .order_by_desc(user::Column::CreatedAt);

        let (models, total) = base::fetch_page(&self.db, query, &params).await?;
        let users = models.into_iter().map(User::from).collect();

        Ok(Paginated::new(users, &params, total))
    }
}

pub(crate) async fn find_active<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<Option<User>> {
    let result = UserEntity::find_by_id(id)
        .filter(user::Column::DeletedAt.is_null())
        .one(conn)
        .await?;

    Ok(result.map(User::from))
}

pub(crate) async fn insert<C: ConnectionTrait>(conn: &C, user: NewUser) -> AppResult<User> {
    let now = chrono::Utc::now();
    let active_model = ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(user.email),
        password_hash: Set(user.password_hash),
        name: Set(user.name),
        phone: Set(user.phone),
        address: Set(user.address),
        role: Set(user.role.as_str().to_string()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    };

    let model = active_model.insert(conn).await?;
    Ok(User::from(model))
}

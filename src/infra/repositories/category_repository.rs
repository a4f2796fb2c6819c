//! Category repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::base;
use super::entities::category::{self, ActiveModel, Entity as CategoryEntity};
use crate::domain::{Category, CategoryChanges};
use crate::errors::{AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Category>>;

    /// Exact, case-sensitive name lookup
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Category>>;

    /// All categories ordered by name, optionally filtered by `is_active`
    async fn list(&self, is_active: Option<bool>) -> AppResult<Vec<Category>>;

    async fn create(&self, name: String, is_active: bool) -> AppResult<Category>;

    async fn update(&self, id: Uuid, changes: CategoryChanges) -> AppResult<Category>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

pub struct CategoryStore {
    db: DatabaseConnection,
}

impl CategoryStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryRepository for CategoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Category>> {
        let result = CategoryEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Category::from))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Category>> {
        let result = CategoryEntity::find()
            .filter(category::Column::Name.eq(name))
            .one(&self.db)
            .await?;

        Ok(result.map(Category::from))
    }

    async fn list(&self, is_active: Option<bool>) -> AppResult<Vec<Category>> {
        let mut query = CategoryEntity::find().order_by_asc(category::Column::Name);

        if let Some(is_active) = is_active {
            query = query.filter(category::Column::IsActive.eq(is_active));
        }

        let models = query.all(&self.db).await?;
        Ok(models.into_iter().map(Category::from).collect())
    }

    async fn create(&self, name: String, is_active: bool) -> AppResult<Category> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            is_active: Set(is_active),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Category::from(model))
    }

    async fn update(&self, id: Uuid, changes: CategoryChanges) -> AppResult<Category> {
        let model = CategoryEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found("Category")?;

        let mut active: ActiveModel = model.into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Ok(Category::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        base::delete_by_id::<CategoryEntity, _>(&self.db, id, "Category").await
    }
}

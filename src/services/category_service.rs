//! Category service - menu sections.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Category, CategoryChanges};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[async_trait]
pub trait CategoryService: Send + Sync {
    /// All categories ordered by name
    async fn list_categories(&self, is_active: Option<bool>) -> AppResult<Vec<Category>>;

    async fn get_category(&self, id: Uuid) -> AppResult<Category>;

    /// Names are unique
    async fn create_category(&self, name: String, is_active: bool) -> AppResult<Category>;

    async fn update_category(&self, id: Uuid, changes: CategoryChanges) -> AppResult<Category>;

    /// Fails with a conflict while dishes are still filed under the category
    async fn delete_category(&self, id: Uuid) -> AppResult<()>;
}

pub struct CategoryManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CategoryManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn ensure_name_free(&self, name: &str, except: Option<Uuid>) -> AppResult<()> {
        match self.uow.categories().find_by_name(name).await? {
            Some(existing) if Some(existing.id) != except => Err(AppError::conflict(format!(
                "Category '{}' already exists",
                name
            ))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> CategoryService for CategoryManager<U> {
    async fn list_categories(&self, is_active: Option<bool>) -> AppResult<Vec<Category>> {
        self.uow.categories().list(is_active).await
    }

    async fn get_category(&self, id: Uuid) -> AppResult<Category> {
        self.uow
            .categories()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Category")
    }

    async fn create_category(&self, name: String, is_active: bool) -> AppResult<Category> {
        let name = name.trim().to_string();
        self.ensure_name_free(&name, None).await?;

        let category = self.uow.categories().create(name, is_active).await?;
        tracing::info!(category_id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    async fn update_category(&self, id: Uuid, changes: CategoryChanges) -> AppResult<Category> {
        let changes = CategoryChanges {
            name: changes.name.map(|n| n.trim().to_string()),
            ..changes
        };

        if let Some(name) = &changes.name {
            self.ensure_name_free(name, Some(id)).await?;
        }

        self.uow.categories().update(id, changes).await
    }

    async fn delete_category(&self, id: Uuid) -> AppResult<()> {
        let dish_count = self.uow.dishes().count_by_category(id).await?;
        if dish_count > 0 {
            return Err(AppError::conflict(format!(
                "Category still has {} dish(es)",
                dish_count
            )));
        }

        self.uow.categories().delete(id).await
    }
}

//! Dish service - the menu.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Dish, DishChanges, DishFilter, NewDish};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

#[async_trait]
pub trait DishService: Send + Sync {
    async fn list_dishes(&self, filter: DishFilter, params: PaginationParams) -> AppResult<Paginated<Dish>>;

    async fn get_dish(&self, id: Uuid) -> AppResult<Dish>;

    /// Create a dish; the category must exist
    async fn create_dish(&self, dish: NewDish) -> AppResult<Dish>;

    async fn update_dish(&self, id: Uuid, changes: DishChanges) -> AppResult<Dish>;

    async fn delete_dish(&self, id: Uuid) -> AppResult<()>;
}

pub struct DishManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> DishManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn ensure_category(&self, category_id: Uuid) -> AppResult<()> {
        if self.uow.categories().find_by_id(category_id).await?.is_none() {
            return Err(AppError::bad_request(format!(
                "Category {} does not exist",
                category_id
            )));
        }
        Ok(())
    }
}

fn ensure_price(base_price: i64) -> AppResult<()> {
    if base_price < 0 {
        return Err(AppError::validation("Base price must not be negative"));
    }
    Ok(())
}

#[async_trait]
impl<U: UnitOfWork> DishService for DishManager<U> {
    async fn list_dishes(&self, filter: DishFilter, params: PaginationParams) -> AppResult<Paginated<Dish>> {
        self.uow.dishes().list(filter, params).await
    }

    async fn get_dish(&self, id: Uuid) -> AppResult<Dish> {
        self.uow.dishes().find_by_id(id).await?.ok_or_not_found("Dish")
    }

    async fn create_dish(&self, dish: NewDish) -> AppResult<Dish> {
        ensure_price(dish.base_price)?;
        self.ensure_category(dish.category_id).await?;

        let dish = self.uow.dishes().create(dish).await?;
        tracing::info!(dish_id = %dish.id, name = %dish.name, "Dish created");
        Ok(dish)
    }

    async fn update_dish(&self, id: Uuid, changes: DishChanges) -> AppResult<Dish> {
        if let Some(price) = changes.base_price {
            ensure_price(price)?;
        }
        if let Some(category_id) = changes.category_id {
            self.ensure_category(category_id).await?;
        }

        self.uow.dishes().update(id, changes).await
    }

    async fn delete_dish(&self, id: Uuid) -> AppResult<()> {
        self.uow.dishes().delete(id).await?;
        tracing::info!(dish_id = %id, "Dish deleted");
        Ok(())
    }
}

//! Dish repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::base;
use super::entities::dish::{self, ActiveModel, Entity as DishEntity};
use crate::domain::{Dish, DishChanges, DishFilter, NewDish};
use crate::errors::{AppResult, OptionExt};
use crate::types::{Paginated, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait DishRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Dish>>;

    /// Load every dish whose id is in `ids`; missing ids are skipped
    async fn find_by_ids(&self, ids: Vec<Uuid>) -> AppResult<Vec<Dish>>;

    async fn list(&self, filter: DishFilter, params: PaginationParams) -> AppResult<Paginated<Dish>>;

    async fn create(&self, dish: NewDish) -> AppResult<Dish>;

    async fn update(&self, id: Uuid, changes: DishChanges) -> AppResult<Dish>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Number of dishes filed under a category
    async fn count_by_category(&self, category_id: Uuid) -> AppResult<u64>;
}

pub struct DishStore {
    db: DatabaseConnection,
}

impl DishStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DishRepository for DishStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Dish>> {
        DishEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Dish::try_from)
            .transpose()
    }

    async fn find_by_ids(&self, ids: Vec<Uuid>) -> AppResult<Vec<Dish>> {
        load_many(&self.db, ids).await
    }

    async fn list(&self, filter: DishFilter, params: PaginationParams) -> AppResult<Paginated<Dish>> {
        let mut condition = Condition::all();

        if let Some(category_id) = filter.category_id {
            condition = condition.add(dish::Column::CategoryId.eq(category_id));
        }
        if let Some(status) = filter.status {
            condition = condition.add(dish::Column::Status.eq(status.as_str()));
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            condition = condition.add(base::contains_ci(dish::Column::Name, search));
        }

        let query = DishEntity::find()
            .filter(condition)
            .order_by_asc(dish::Column::Name);

        let (models, total) = base::fetch_page(&self.db, query, &params).await?;
        let dishes = models
            .into_iter()
            .map(Dish::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Paginated::new(dishes, &params, total))
    }

    async fn create(&self, dish: NewDish) -> AppResult<Dish> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(dish.name),
            description: Set(dish.description),
            base_price: Set(dish.base_price),
            status: Set(dish.status.as_str().to_string()),
            category_id: Set(dish.category_id),
            size: Set(dish.size),
            type_name: Set(dish.type_name),
            image_url: Set(dish.image_url),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Dish::try_from(model)
    }

    async fn update(&self, id: Uuid, changes: DishChanges) -> AppResult<Dish> {
        let model = DishEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found("Dish")?;

        let mut active: ActiveModel = model.into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        if let Some(base_price) = changes.base_price {
            active.base_price = Set(base_price);
        }
        if let Some(status) = changes.status {
            active.status = Set(status.as_str().to_string());
        }
        if let Some(category_id) = changes.category_id {
            active.category_id = Set(category_id);
        }
        if let Some(size) = changes.size {
            active.size = Set(Some(size));
        }
        if let Some(type_name) = changes.type_name {
            active.type_name = Set(Some(type_name));
        }
        if let Some(image_url) = changes.image_url {
            active.image_url = Set(Some(image_url));
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Dish::try_from(model)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        base::delete_by_id::<DishEntity, _>(&self.db, id, "Dish").await
    }

    async fn count_by_category(&self, category_id: Uuid) -> AppResult<u64> {
        let query = DishEntity::find().filter(dish::Column::CategoryId.eq(category_id));
        base::count(&self.db, query).await
    }
}

pub(crate) async fn load_many<C: ConnectionTrait>(conn: &C, ids: Vec<Uuid>) -> AppResult<Vec<Dish>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    DishEntity::find()
        .filter(dish::Column::Id.is_in(ids))
        .all(conn)
        .await?
        .into_iter()
        .map(Dish::try_from)
        .collect()
}

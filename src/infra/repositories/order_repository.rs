//! Order repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::base;
use super::entities::order::{self, ActiveModel, Entity as OrderEntity};
use crate::domain::{NewOrder, Order, OrderFilter, OrderStatus};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::types::{Paginated, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>>;

    /// Page through orders, newest first
    async fn list(&self, filter: OrderFilter, params: PaginationParams) -> AppResult<Paginated<Order>>;

    /// Every order created in `[start, end)`, oldest first
    async fn list_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Order>>;

    async fn create(&self, order: NewOrder) -> AppResult<Order>;

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> AppResult<Order>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

pub struct OrderStore {
    db: DatabaseConnection,
}

impl OrderStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderRepository for OrderStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>> {
        find(&self.db, id).await
    }

    async fn list(&self, filter: OrderFilter, params: PaginationParams) -> AppResult<Paginated<Order>> {
        let mut condition = Condition::all();

        if let Some(user_id) = filter.user_id {
            condition = condition.add(order::Column::UserId.eq(user_id));
        }
        if let Some(status) = filter.status {
            condition = condition.add(order::Column::Status.eq(status.as_str()));
        }
        if let Some(order_type) = filter.order_type {
            condition = condition.add(order::Column::OrderType.eq(order_type.as_str()));
        }

        let query = OrderEntity::find()
            .filter(condition)
            .order_by_desc(order::Column::CreatedAt);

        let (models, total) = base::fetch_page(&self.db, query, &params).await?;
        let orders = models
            .into_iter()
            .map(Order::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Paginated::new(orders, &params, total))
    }

    async fn list_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Order>> {
        OrderEntity::find()
            .filter(order::Column::CreatedAt.gte(start))
            .filter(order::Column::CreatedAt.lt(end))
            .order_by_asc(order::Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Order::try_from)
            .collect()
    }

    async fn create(&self, order: NewOrder) -> AppResult<Order> {
        insert(&self.db, order).await
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> AppResult<Order> {
        set_status(&self.db, id, status).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        base::delete_by_id::<OrderEntity, _>(&self.db, id, "Order").await
    }
}

pub(crate) async fn find<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<Option<Order>> {
    OrderEntity::find_by_id(id)
        .one(conn)
        .await?
        .map(Order::try_from)
        .transpose()
}

pub(crate) async fn insert<C: ConnectionTrait>(conn: &C, order: NewOrder) -> AppResult<Order> {
    let order_items = serde_json::to_value(&order.order_items)
        .map_err(|e| AppError::internal(format!("Failed to encode order items: {}", e)))?;

    let now = chrono::Utc::now();
    let active_model = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(order.user_id),
        order_items: Set(order_items),
        total_amount: Set(order.total_amount),
        status: Set(order.status.as_str().to_string()),
        order_type: Set(order.order_type.as_str().to_string()),
        delivery_address: Set(order.delivery_address),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let model = active_model.insert(conn).await?;
    Order::try_from(model)
}

pub(crate) async fn set_status<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    status: OrderStatus,
) -> AppResult<Order> {
    let model = OrderEntity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_not_found("Order")?;

    let mut active: ActiveModel = model.into();
    active.status = Set(status.as_str().to_string());
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(conn).await?;
    Order::try_from(model)
}

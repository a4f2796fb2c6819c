use sea_orm::entity::prelude::*;

use crate::domain::{Order, OrderItem};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    /// Priced line items, stored as a JSON array
    #[sea_orm(column_type = "JsonBinary")]
    pub order_items: Json,
    pub total_amount: i64,
    pub status: String,
    pub order_type: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub delivery_address: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::user_transaction::Entity")]
    Transactions,
    #[sea_orm(has_one = "super::review::Entity")]
    Review,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::user_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Review.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Order {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let order_items: Vec<OrderItem> = serde_json::from_value(model.order_items)
            .map_err(|e| AppError::internal(format!("Corrupt items on order {}: {}", model.id, e)))?;

        Ok(Order {
            id: model.id,
            user_id: model.user_id,
            order_items,
            total_amount: model.total_amount,
            status: model.status.parse()?,
            order_type: model.order_type.parse()?,
            delivery_address: model.delivery_address,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

use sea_orm::entity::prelude::*;

use crate::domain::Dish;
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "dishes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub base_price: i64,
    pub status: String,
    pub category_id: Uuid,
    pub size: Option<String>,
    pub type_name: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Category,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Dish {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Dish {
            id: model.id,
            name: model.name,
            description: model.description,
            base_price: model.base_price,
            status: model.status.parse()?,
            category_id: model.category_id,
            size: model.size,
            type_name: model.type_name,
            image_url: model.image_url,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

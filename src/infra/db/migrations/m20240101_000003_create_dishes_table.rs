//! Migration: Create dishes table.

use sea_orm_migration::prelude::*;

use super::m20240101_000002_create_categories_table::Categories;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Dishes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Dishes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Dishes::Name).string().not_null())
                    .col(ColumnDef::new(Dishes::Description).text().null())
                    .col(ColumnDef::new(Dishes::BasePrice).big_integer().not_null())
                    .col(
                        ColumnDef::new(Dishes::Status)
                            .string_len(16)
                            .not_null()
                            .default("available"),
                    )
                    .col(ColumnDef::new(Dishes::CategoryId).uuid().not_null())
                    .col(ColumnDef::new(Dishes::Size).string_len(32).null())
                    .col(ColumnDef::new(Dishes::TypeName).string_len(64).null())
                    .col(ColumnDef::new(Dishes::ImageUrl).string().null())
                    .col(
                        ColumnDef::new(Dishes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Dishes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dishes_category")
                            .from(Dishes::Table, Dishes::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_dishes_category_id")
                    .table(Dishes::Table)
                    .col(Dishes::CategoryId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Dishes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Dishes {
    Table,
    Id,
    Name,
    Description,
    BasePrice,
    Status,
    CategoryId,
    Size,
    TypeName,
    ImageUrl,
    CreatedAt,
    UpdatedAt,
}

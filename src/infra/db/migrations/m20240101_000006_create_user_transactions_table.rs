//! Migration: Create user_transactions table.

use sea_orm_migration::prelude::*;

use super::m20240101_000004_create_orders_table::Orders;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserTransactions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserTransactions::OrderId).uuid().not_null())
                    .col(
                        ColumnDef::new(UserTransactions::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserTransactions::Method)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserTransactions::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(UserTransactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserTransactions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_transactions_order")
                            .from(UserTransactions::Table, UserTransactions::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_transactions_order_id")
                    .table(UserTransactions::Table)
                    .col(UserTransactions::OrderId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserTransactions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserTransactions {
    Table,
    Id,
    OrderId,
    Amount,
    Method,
    Status,
    CreatedAt,
    UpdatedAt,
}

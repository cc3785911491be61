//! Create docks table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Docks::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Docks::Id).string().not_null().primary_key())
                    .col(
                        ColumnDef::new(Docks::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Docks::Length).double().not_null())
                    .col(ColumnDef::new(Docks::MaxDraft).double().not_null())
                    .col(ColumnDef::new(Docks::Location).string())
                    .col(
                        ColumnDef::new(Docks::Status)
                            .string_len(20)
                            .not_null()
                            .default("available"),
                    )
                    .col(
                        ColumnDef::new(Docks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Docks::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Docks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Docks {
    Table,
    Id,
    Name,
    Length,
    MaxDraft,
    Location,
    Status,
    CreatedAt,
    UpdatedAt,
}

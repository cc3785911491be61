//! Create ships table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ships::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Ships::Id).string().not_null().primary_key())
                    .col(
                        ColumnDef::new(Ships::ImoNumber)
                            .string_len(7)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Ships::Name).string().not_null())
                    .col(ColumnDef::new(Ships::ShipType).string_len(20).not_null())
                    .col(ColumnDef::new(Ships::Length).double().not_null())
                    .col(ColumnDef::new(Ships::GrossTonnage).double().not_null())
                    .col(ColumnDef::new(Ships::Flag).string().not_null())
                    .col(ColumnDef::new(Ships::Company).string().not_null())
                    .col(ColumnDef::new(Ships::RegisteredBy).string().not_null())
                    .col(
                        ColumnDef::new(Ships::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ships::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Ships {
    Table,
    Id,
    ImoNumber,
    Name,
    ShipType,
    Length,
    GrossTonnage,
    Flag,
    Company,
    RegisteredBy,
    CreatedAt,
}

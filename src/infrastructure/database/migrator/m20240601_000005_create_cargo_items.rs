//! Create cargo_items table
//!
//! Children of a berthing, removed with it.

use sea_orm_migration::prelude::*;

use super::m20240601_000004_create_berthings::Berthings;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CargoItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CargoItems::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CargoItems::BerthingId).string().not_null())
                    .col(
                        ColumnDef::new(CargoItems::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(CargoItems::Description).text().not_null())
                    .col(ColumnDef::new(CargoItems::Weight).double().not_null())
                    .col(ColumnDef::new(CargoItems::CargoType).string_len(20).not_null())
                    .col(ColumnDef::new(CargoItems::Quantity).double().not_null())
                    .col(ColumnDef::new(CargoItems::Unit).string_len(20).not_null())
                    .col(ColumnDef::new(CargoItems::CargoOwnerId).string().not_null())
                    .col(
                        ColumnDef::new(CargoItems::CustomsStatus)
                            .string_len(20)
                            .not_null()
                            .default("not_verified"),
                    )
                    .col(ColumnDef::new(CargoItems::Notes).text())
                    .col(ColumnDef::new(CargoItems::ProcessedBy).string())
                    .col(ColumnDef::new(CargoItems::ClearedBy).string())
                    .col(ColumnDef::new(CargoItems::ClearedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(CargoItems::AuditTrail)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cargo_items_berthing")
                            .from(CargoItems::Table, CargoItems::BerthingId)
                            .to(Berthings::Table, Berthings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cargo_items_berthing")
                    .table(CargoItems::Table)
                    .col(CargoItems::BerthingId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cargo_items_owner")
                    .table(CargoItems::Table)
                    .col(CargoItems::CargoOwnerId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CargoItems::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum CargoItems {
    Table,
    Id,
    BerthingId,
    Position,
    Description,
    Weight,
    CargoType,
    Quantity,
    Unit,
    CargoOwnerId,
    CustomsStatus,
    Notes,
    ProcessedBy,
    ClearedBy,
    ClearedAt,
    AuditTrail,
}

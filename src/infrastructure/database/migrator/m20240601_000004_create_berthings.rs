//! Create berthings table
//!
//! `version` backs optimistic concurrency for transitions and customs writes.

use sea_orm_migration::prelude::*;

use super::m20240601_000002_create_ships::Ships;
use super::m20240601_000003_create_docks::Docks;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Berthings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Berthings::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Berthings::ShipId).string().not_null())
                    .col(ColumnDef::new(Berthings::DockId).string().not_null())
                    .col(
                        ColumnDef::new(Berthings::ArrivalDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Berthings::DepartureDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Berthings::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Berthings::Documents)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(Berthings::Notes).text())
                    .col(ColumnDef::new(Berthings::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Berthings::ApprovedBy).string())
                    .col(ColumnDef::new(Berthings::RejectedBy).string())
                    .col(ColumnDef::new(Berthings::RejectionReason).text())
                    .col(
                        ColumnDef::new(Berthings::Version)
                            .big_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Berthings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Berthings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_berthings_ship")
                            .from(Berthings::Table, Berthings::ShipId)
                            .to(Ships::Table, Ships::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_berthings_dock")
                            .from(Berthings::Table, Berthings::DockId)
                            .to(Docks::Table, Docks::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_berthings_dock")
                    .table(Berthings::Table)
                    .col(Berthings::DockId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_berthings_status")
                    .table(Berthings::Table)
                    .col(Berthings::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_berthings_created_by")
                    .table(Berthings::Table)
                    .col(Berthings::CreatedBy)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Berthings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Berthings {
    Table,
    Id,
    ShipId,
    DockId,
    ArrivalDate,
    DepartureDate,
    Status,
    Documents,
    Notes,
    CreatedBy,
    ApprovedBy,
    RejectedBy,
    RejectionReason,
    Version,
    CreatedAt,
    UpdatedAt,
}

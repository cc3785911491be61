//! Berthing entity
//!
//! Cargo lines live in `cargo_items`; document metadata is JSON text.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "berthings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub ship_id: String,
    pub dock_id: String,
    pub arrival_date: DateTime<Utc>,
    pub departure_date: DateTime<Utc>,
    pub status: String,
    /// JSON array of document references
    pub documents: String,
    pub notes: Option<String>,
    pub created_by: String,
    pub approved_by: Option<String>,
    pub rejected_by: Option<String>,
    pub rejection_reason: Option<String>,
    /// Optimistic concurrency counter
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ship::Entity",
        from = "Column::ShipId",
        to = "super::ship::Column::Id"
    )]
    Ship,
    #[sea_orm(
        belongs_to = "super::dock::Entity",
        from = "Column::DockId",
        to = "super::dock::Column::Id"
    )]
    Dock,
    #[sea_orm(has_many = "super::cargo_item::Entity")]
    CargoItems,
}

impl Related<super::ship::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ship.def()
    }
}

impl Related<super::dock::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dock.def()
    }
}

impl Related<super::cargo_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CargoItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

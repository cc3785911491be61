//! Cargo line entity, owned by one berthing

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cargo_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub berthing_id: String,
    /// Order within the berthing
    pub position: i32,
    pub description: String,
    pub weight: f64,
    pub cargo_type: String,
    pub quantity: f64,
    pub unit: String,
    pub cargo_owner_id: String,
    pub customs_status: String,
    pub notes: Option<String>,
    pub processed_by: Option<String>,
    pub cleared_by: Option<String>,
    pub cleared_at: Option<DateTime<Utc>>,
    /// JSON array of audit entries, append-only
    pub audit_trail: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::berthing::Entity",
        from = "Column::BerthingId",
        to = "super::berthing::Column::Id",
        on_delete = "Cascade"
    )]
    Berthing,
}

impl Related<super::berthing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Berthing.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

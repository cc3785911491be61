//! Dock entity

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "docks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub name: String,
    pub length: f64,
    pub max_draft: f64,
    pub location: Option<String>,
    /// available | occupied | maintenance
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::berthing::Entity")]
    Berthings,
}

impl Related<super::berthing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Berthings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

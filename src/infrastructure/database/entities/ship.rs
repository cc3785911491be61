//! Ship entity

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ships")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub imo_number: String,
    pub name: String,
    pub ship_type: String,
    pub length: f64,
    pub gross_tonnage: f64,
    pub flag: String,
    pub company: String,
    pub registered_by: String,
    pub created_at: DateTime<Utc>,
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

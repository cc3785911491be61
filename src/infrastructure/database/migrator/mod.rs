//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_users;
mod m20240601_000002_create_ships;
mod m20240601_000003_create_docks;
mod m20240601_000004_create_berthings;
mod m20240601_000005_create_cargo_items;
mod m20240601_000006_create_notifications;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_users::Migration),
            Box::new(m20240601_000002_create_ships::Migration),
            Box::new(m20240601_000003_create_docks::Migration),
            Box::new(m20240601_000004_create_berthings::Migration),
            Box::new(m20240601_000005_create_cargo_items::Migration),
            Box::new(m20240601_000006_create_notifications::Migration),
        ]
    }
}

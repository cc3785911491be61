//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::{
    BerthingRepository, DockRepository, NotificationRepository, RepositoryProvider,
    ShipRepository, UserRepository,
};

use super::berthing_repository::SeaOrmBerthingRepository;
use super::dock_repository::SeaOrmDockRepository;
use super::notification_repository::SeaOrmNotificationRepository;
use super::ship_repository::SeaOrmShipRepository;
use super::user_repository::SeaOrmUserRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let dock = repos.docks().find_by_name("North 1").await?;
/// let pending = repos.berthings().find_in_statuses(&[BerthingStatus::Pending]).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    users: SeaOrmUserRepository,
    ships: SeaOrmShipRepository,
    docks: SeaOrmDockRepository,
    berthings: SeaOrmBerthingRepository,
    notifications: SeaOrmNotificationRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: SeaOrmUserRepository::new(db.clone()),
            ships: SeaOrmShipRepository::new(db.clone()),
            docks: SeaOrmDockRepository::new(db.clone()),
            berthings: SeaOrmBerthingRepository::new(db.clone()),
            notifications: SeaOrmNotificationRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn ships(&self) -> &dyn ShipRepository {
        &self.ships
    }

    fn docks(&self) -> &dyn DockRepository {
        &self.docks
    }

    fn berthings(&self) -> &dyn BerthingRepository {
        &self.berthings
    }

    fn notifications(&self) -> &dyn NotificationRepository {
        &self.notifications
    }
}

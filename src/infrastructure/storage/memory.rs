//! In-memory repositories for development and testing
//!
//! Users, ships and notifications sit in `DashMap`s. Docks and berthings
//! share one async mutex so a berthing write and its dock claim are a
//! single critical section, mirroring the database transaction.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::domain::{
    Berthing, BerthingFilter, BerthingRepository, BerthingStatus, CargoDetail, Dock, DockClaim,
    DockRepository, DockStatus, DomainError, DomainResult, Notification, NotificationFilter,
    NotificationRepository, RepositoryProvider, Ship, ShipRepository, User, UserRepository,
    UserRole,
};
use crate::shared::{PaginatedResult, PaginationParams};

/// `usernames` maps username to user id, standing in for the unique index
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: DashMap<String, User>,
    usernames: DashMap<String, String>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save(&self, user: User) -> DomainResult<()> {
        match self.usernames.entry(user.username.clone()) {
            Entry::Occupied(owner) if owner.get() != &user.id => {
                return Err(DomainError::Conflict(format!(
                    "Username {} is taken",
                    user.username
                )));
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(slot) => {
                slot.insert(user.id.clone());
            }
        }

        let (id, username) = (user.id.clone(), user.username.clone());
        if let Some(previous) = self.users.insert(id.clone(), user) {
            if previous.username != username {
                self.usernames.remove_if(&previous.username, |_, owner| owner == &id);
            }
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        Ok(self.users.get(id).map(|u| u.clone()))
    }

    async fn find_active_by_roles(&self, roles: &[UserRole]) -> DomainResult<Vec<User>> {
        Ok(self
            .users
            .iter()
            .filter(|u| u.is_active && roles.contains(&u.role))
            .map(|u| u.clone())
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryShipRepository {
    ships: DashMap<String, Ship>,
    by_imo: DashMap<String, String>,
}

#[async_trait]
impl ShipRepository for InMemoryShipRepository {
    async fn save(&self, ship: Ship) -> DomainResult<()> {
        // The entry guard is held across the insert so a racing
        // registration of the same IMO sees it as taken.
        match self.by_imo.entry(ship.imo_number.clone()) {
            Entry::Occupied(owner) if owner.get() != &ship.id => {
                Err(DomainError::Conflict(format!(
                    "Ship with IMO {} is already registered",
                    ship.imo_number
                )))
            }
            Entry::Occupied(_) => {
                self.ships.insert(ship.id.clone(), ship);
                Ok(())
            }
            Entry::Vacant(slot) => {
                slot.insert(ship.id.clone());
                self.ships.insert(ship.id.clone(), ship);
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Ship>> {
        Ok(self.ships.get(id).map(|s| s.clone()))
    }

    async fn find_by_imo(&self, imo_number: &str) -> DomainResult<Option<Ship>> {
        let Some(id) = self.by_imo.get(imo_number).map(|id| id.clone()) else {
            return Ok(None);
        };
        Ok(self.ships.get(&id).map(|s| s.clone()))
    }

    async fn find_all(&self, page: PaginationParams) -> DomainResult<PaginatedResult<Ship>> {
        let mut all: Vec<Ship> = self.ships.iter().map(|s| s.clone()).collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(PaginatedResult::from_vec(all, page))
    }
}

#[derive(Default)]
struct AllocationState {
    docks: HashMap<String, Dock>,
    berthings: HashMap<String, Berthing>,
}

impl AllocationState {
    /// The single place dock status changes for berthing transitions
    fn apply_claim(&mut self, dock_id: &str, claim: DockClaim) -> DomainResult<()> {
        if claim == DockClaim::Keep {
            return Ok(());
        }
        let Some(dock) = self.docks.get_mut(dock_id) else {
            return match claim {
                DockClaim::Reserve => Err(DomainError::not_found("Dock", dock_id)),
                _ => Ok(()),
            };
        };
        if claim == DockClaim::Reserve && dock.status != DockStatus::Available {
            return Err(DomainError::Conflict(format!(
                "Dock {} is {}",
                dock.name, dock.status
            )));
        }
        if let Some(status) = claim.target_status() {
            dock.status = status;
            dock.updated_at = Utc::now();
        }
        Ok(())
    }

    fn check_version(&self, berthing: &Berthing) -> DomainResult<()> {
        match self.berthings.get(&berthing.id) {
            Some(stored) if stored.version == berthing.version => Ok(()),
            _ => Err(DomainError::StaleWrite {
                entity: "Berthing",
                id: berthing.id.clone(),
            }),
        }
    }
}

/// Docks and berthings behind one lock
#[derive(Default)]
pub struct InMemoryAllocationStore {
    state: Mutex<AllocationState>,
}

#[async_trait]
impl DockRepository for InMemoryAllocationStore {
    async fn save(&self, dock: Dock) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        if state.docks.values().any(|d| d.name == dock.name) {
            return Err(DomainError::Conflict(format!(
                "Dock '{}' already exists",
                dock.name
            )));
        }
        state.docks.insert(dock.id.clone(), dock);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Dock>> {
        Ok(self.state.lock().await.docks.get(id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> DomainResult<Option<Dock>> {
        Ok(self
            .state
            .lock()
            .await
            .docks
            .values()
            .find(|d| d.name == name)
            .cloned())
    }

    async fn find_all(&self, status: Option<DockStatus>) -> DomainResult<Vec<Dock>> {
        let state = self.state.lock().await;
        let mut docks: Vec<Dock> = state
            .docks
            .values()
            .filter(|d| status.map_or(true, |s| d.status == s))
            .cloned()
            .collect();
        docks.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(docks)
    }

    async fn set_maintenance(&self, id: &str, enabled: bool) -> DomainResult<Dock> {
        let mut state = self.state.lock().await;
        let dock = state
            .docks
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("Dock", id))?;

        let (from, to) = if enabled {
            (DockStatus::Available, DockStatus::Maintenance)
        } else {
            (DockStatus::Maintenance, DockStatus::Available)
        };
        if dock.status == from {
            dock.status = to;
            dock.updated_at = Utc::now();
        } else if dock.status != to {
            return Err(DomainError::Conflict(format!(
                "Dock {} is {}",
                dock.name, dock.status
            )));
        }
        Ok(dock.clone())
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        let dock = state
            .docks
            .get(id)
            .ok_or_else(|| DomainError::not_found("Dock", id))?;
        if dock.status == DockStatus::Occupied {
            return Err(DomainError::Conflict(format!("Dock {} is occupied", dock.name)));
        }
        if state.berthings.values().any(|b| b.dock_id == id) {
            return Err(DomainError::Conflict(format!(
                "Dock {} is referenced by berthings",
                dock.name
            )));
        }
        state.docks.remove(id);
        Ok(())
    }
}

#[async_trait]
impl BerthingRepository for InMemoryAllocationStore {
    async fn insert_reserving_dock(&self, berthing: &Berthing) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        state.apply_claim(&berthing.dock_id, DockClaim::Reserve)?;
        state.berthings.insert(berthing.id.clone(), berthing.clone());
        Ok(())
    }

    async fn save_transition(&self, berthing: &Berthing, claim: DockClaim) -> DomainResult<i64> {
        let mut state = self.state.lock().await;
        state.check_version(berthing)?;
        state.apply_claim(&berthing.dock_id, claim)?;

        let mut stored = berthing.clone();
        stored.version += 1;
        let version = stored.version;
        state.berthings.insert(stored.id.clone(), stored);
        Ok(version)
    }

    async fn save_cargo(&self, berthing: &Berthing, cargo: &CargoDetail) -> DomainResult<i64> {
        let mut state = self.state.lock().await;
        state.check_version(berthing)?;
        let stored = state
            .berthings
            .get_mut(&berthing.id)
            .ok_or_else(|| DomainError::not_found("Berthing", &berthing.id))?;
        let line = stored
            .cargo_mut(&cargo.id)
            .ok_or_else(|| DomainError::not_found("Cargo", &cargo.id))?;
        *line = cargo.clone();
        stored.version += 1;
        stored.updated_at = Utc::now();
        Ok(stored.version)
    }

    async fn delete(&self, berthing: &Berthing, claim: DockClaim) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        state.check_version(berthing)?;
        state.apply_claim(&berthing.dock_id, claim)?;
        state.berthings.remove(&berthing.id);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Berthing>> {
        Ok(self.state.lock().await.berthings.get(id).cloned())
    }

    async fn find_by_cargo_id(&self, cargo_id: &str) -> DomainResult<Option<Berthing>> {
        Ok(self
            .state
            .lock()
            .await
            .berthings
            .values()
            .find(|b| b.cargo(cargo_id).is_some())
            .cloned())
    }

    async fn find_all(
        &self,
        filter: &BerthingFilter,
        page: PaginationParams,
    ) -> DomainResult<PaginatedResult<Berthing>> {
        let state = self.state.lock().await;
        let mut all: Vec<Berthing> = state
            .berthings
            .values()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(PaginatedResult::from_vec(all, page))
    }

    async fn find_in_statuses(&self, statuses: &[BerthingStatus]) -> DomainResult<Vec<Berthing>> {
        let state = self.state.lock().await;
        let mut found: Vec<Berthing> = state
            .berthings
            .values()
            .filter(|b| statuses.contains(&b.status))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.arrival_date.cmp(&b.arrival_date));
        Ok(found)
    }
}

#[derive(Default)]
pub struct InMemoryNotificationRepository {
    notifications: DashMap<String, Notification>,
}

impl InMemoryNotificationRepository {
    fn ids_for(&self, user_id: &str, pred: impl Fn(&Notification) -> bool) -> Vec<String> {
        self.notifications
            .iter()
            .filter(|n| n.user_id == user_id && pred(n.value()))
            .map(|n| n.id.clone())
            .collect()
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn insert(&self, notification: &Notification) -> DomainResult<()> {
        self.notifications
            .insert(notification.id.clone(), notification.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Notification>> {
        Ok(self.notifications.get(id).map(|n| n.clone()))
    }

    async fn find_for_user(
        &self,
        user_id: &str,
        filter: &NotificationFilter,
        page: PaginationParams,
    ) -> DomainResult<PaginatedResult<Notification>> {
        let mut all: Vec<Notification> = self
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && filter.matches(n.value()))
            .map(|n| n.clone())
            .collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(PaginatedResult::from_vec(all, page))
    }

    async fn count_unread(&self, user_id: &str) -> DomainResult<u64> {
        Ok(self.ids_for(user_id, |n| !n.read).len() as u64)
    }

    async fn mark_read(&self, id: &str) -> DomainResult<Notification> {
        let mut entry = self
            .notifications
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("Notification", id))?;
        if !entry.read {
            entry.read = true;
            entry.read_at = Some(Utc::now());
        }
        Ok(entry.clone())
    }

    async fn mark_all_read(&self, user_id: &str) -> DomainResult<u64> {
        let ids = self.ids_for(user_id, |n| !n.read);
        let now = Utc::now();
        for id in &ids {
            if let Some(mut n) = self.notifications.get_mut(id) {
                n.read = true;
                n.read_at = Some(now);
            }
        }
        Ok(ids.len() as u64)
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        self.notifications
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("Notification", id))
    }

    async fn delete_read(&self, user_id: &str) -> DomainResult<u64> {
        let ids = self.ids_for(user_id, |n| n.read);
        for id in &ids {
            self.notifications.remove(id);
        }
        Ok(ids.len() as u64)
    }
}

/// All in-memory repositories behind one provider
#[derive(Default, Clone)]
pub struct InMemoryRepositoryProvider {
    users: Arc<InMemoryUserRepository>,
    ships: Arc<InMemoryShipRepository>,
    allocation: Arc<InMemoryAllocationStore>,
    notifications: Arc<InMemoryNotificationRepository>,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn users(&self) -> &dyn UserRepository {
        self.users.as_ref()
    }

    fn ships(&self) -> &dyn ShipRepository {
        self.ships.as_ref()
    }

    fn docks(&self) -> &dyn DockRepository {
        self.allocation.as_ref()
    }

    fn berthings(&self) -> &dyn BerthingRepository {
        self.allocation.as_ref()
    }

    fn notifications(&self) -> &dyn NotificationRepository {
        self.notifications.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewBerthing, NewDock, NewShip, ShipType};
    use chrono::Duration;
    use futures_util::future::join_all;

    async fn seeded() -> (InMemoryRepositoryProvider, Dock, Berthing) {
        let repos = InMemoryRepositoryProvider::new();
        let dock = Dock::register(NewDock {
            name: "D1".into(),
            length: 200.0,
            max_draft: 12.0,
            location: None,
        })
        .unwrap();
        repos.docks().save(dock.clone()).await.unwrap();

        let now = Utc::now();
        let berthing = Berthing::request(
            NewBerthing {
                ship_id: "s1".into(),
                dock_id: dock.id.clone(),
                arrival_date: now,
                departure_date: now + Duration::days(2),
                cargo: vec![],
                documents: vec![],
                notes: None,
            },
            "agent",
        )
        .unwrap();
        (repos, dock, berthing)
    }

    #[tokio::test]
    async fn reserve_is_compare_and_swap() {
        let (repos, dock, berthing) = seeded().await;
        repos.berthings().insert_reserving_dock(&berthing).await.unwrap();

        let mut second = berthing.clone();
        second.id = "other".into();
        let err = repos.berthings().insert_reserving_dock(&second).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert!(repos.berthings().find_by_id("other").await.unwrap().is_none());

        let dock = repos.docks().find_by_id(&dock.id).await.unwrap().unwrap();
        assert_eq!(dock.status, DockStatus::Occupied);
    }

    #[tokio::test]
    async fn stale_version_is_rejected() {
        let (repos, dock, berthing) = seeded().await;
        repos.berthings().insert_reserving_dock(&berthing).await.unwrap();

        let version = repos
            .berthings()
            .save_transition(&berthing, DockClaim::Hold)
            .await
            .unwrap();
        assert_eq!(version, 2);

        let err = repos
            .berthings()
            .save_transition(&berthing, DockClaim::Release)
            .await
            .unwrap_err();
        assert!(err.is_stale_write());
        let dock = repos.docks().find_by_id(&dock.id).await.unwrap().unwrap();
        assert_eq!(dock.status, DockStatus::Occupied);
    }

    #[tokio::test]
    async fn occupied_dock_refuses_maintenance_and_delete() {
        let (repos, dock, berthing) = seeded().await;
        repos.berthings().insert_reserving_dock(&berthing).await.unwrap();

        assert!(matches!(
            repos.docks().set_maintenance(&dock.id, true).await,
            Err(DomainError::Conflict(_))
        ));
        assert!(matches!(
            repos.docks().delete(&dock.id).await,
            Err(DomainError::Conflict(_))
        ));

        repos.berthings().delete(&berthing, DockClaim::Release).await.unwrap();
        repos.docks().delete(&dock.id).await.unwrap();
        assert!(repos.docks().find_by_id(&dock.id).await.unwrap().is_none());
    }

    fn ship(imo: &str, name: &str) -> Ship {
        Ship::register(
            NewShip {
                imo_number: imo.into(),
                name: name.into(),
                ship_type: ShipType::Container,
                length: 300.0,
                gross_tonnage: 90_000.0,
                flag: "PA".into(),
                company: "Evergreen".into(),
            },
            "agent",
        )
        .unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_registrations_of_one_imo_admit_one() {
        let repos = InMemoryRepositoryProvider::new();
        let attempts = (0..8).map(|i| {
            let repos = repos.clone();
            tokio::spawn(async move {
                repos.ships().save(ship("9321483", &format!("Ever {i}"))).await
            })
        });
        let results: Vec<_> = join_all(attempts)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, DomainError::Conflict(_))));
        let page = repos.ships().find_all(PaginationParams::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert!(repos.ships().find_by_imo("9321483").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn usernames_stay_unique_across_renames() {
        let repos = InMemoryRepositoryProvider::new();
        let mut ana = User::new("u1", "ana", "ana@port", UserRole::MaritimeAgent);
        repos.users().save(ana.clone()).await.unwrap();

        let clash = User::new("u2", "ana", "other@port", UserRole::Viewer);
        assert!(matches!(
            repos.users().save(clash.clone()).await,
            Err(DomainError::Conflict(_))
        ));

        ana.username = "ana.k".into();
        repos.users().save(ana).await.unwrap();
        repos.users().save(clash).await.unwrap();
        assert_eq!(
            repos.users().find_by_id("u2").await.unwrap().unwrap().username,
            "ana"
        );
    }
}

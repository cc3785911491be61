//! Repository providers for workflow tests
//!
//! Both wrap an [`InMemoryRepositoryProvider`] and change one behavior:
//! [`FailingInboxProvider`] refuses every notification write, and
//! [`ContendedProvider`] yields after each berthing read so concurrent
//! requests all read before any of them writes.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::domain::{
    Berthing, BerthingFilter, BerthingRepository, BerthingStatus, CargoDetail, DockClaim,
    DockRepository, DomainError, DomainResult, Notification, NotificationFilter,
    NotificationRepository, RepositoryProvider, ShipRepository, UserRepository,
};
use crate::infrastructure::storage::InMemoryRepositoryProvider;
use crate::shared::{PaginatedResult, PaginationParams};

pub struct FailingInboxProvider {
    inner: InMemoryRepositoryProvider,
    notifications: FailingNotifications,
}

impl FailingInboxProvider {
    pub fn new() -> Self {
        Self {
            inner: InMemoryRepositoryProvider::new(),
            notifications: FailingNotifications,
        }
    }
}

impl RepositoryProvider for FailingInboxProvider {
    fn users(&self) -> &dyn UserRepository {
        self.inner.users()
    }

    fn ships(&self) -> &dyn ShipRepository {
        self.inner.ships()
    }

    fn docks(&self) -> &dyn DockRepository {
        self.inner.docks()
    }

    fn berthings(&self) -> &dyn BerthingRepository {
        self.inner.berthings()
    }

    fn notifications(&self) -> &dyn NotificationRepository {
        &self.notifications
    }
}

struct FailingNotifications;

fn unavailable<T>() -> DomainResult<T> {
    Err(DomainError::Storage("notifications table is locked".into()))
}

#[async_trait]
impl NotificationRepository for FailingNotifications {
    async fn insert(&self, _notification: &Notification) -> DomainResult<()> {
        unavailable()
    }

    async fn find_by_id(&self, _id: &str) -> DomainResult<Option<Notification>> {
        unavailable()
    }

    async fn find_for_user(
        &self,
        _user_id: &str,
        _filter: &NotificationFilter,
        _page: PaginationParams,
    ) -> DomainResult<PaginatedResult<Notification>> {
        unavailable()
    }

    async fn count_unread(&self, _user_id: &str) -> DomainResult<u64> {
        unavailable()
    }

    async fn mark_read(&self, _id: &str) -> DomainResult<Notification> {
        unavailable()
    }

    async fn mark_all_read(&self, _user_id: &str) -> DomainResult<u64> {
        unavailable()
    }

    async fn delete(&self, _id: &str) -> DomainResult<()> {
        unavailable()
    }

    async fn delete_read(&self, _user_id: &str) -> DomainResult<u64> {
        unavailable()
    }
}

pub struct ContendedProvider {
    inner: InMemoryRepositoryProvider,
    berthings: ContendedBerthings,
}

impl ContendedProvider {
    pub fn new() -> Self {
        let inner = InMemoryRepositoryProvider::new();
        Self {
            berthings: ContendedBerthings {
                inner: inner.clone(),
                stale_writes: AtomicUsize::new(0),
            },
            inner,
        }
    }

    /// Writes refused because the berthing changed after it was read
    pub fn stale_writes(&self) -> usize {
        self.berthings.stale_writes.load(Ordering::SeqCst)
    }
}

impl RepositoryProvider for ContendedProvider {
    fn users(&self) -> &dyn UserRepository {
        self.inner.users()
    }

    fn ships(&self) -> &dyn ShipRepository {
        self.inner.ships()
    }

    fn docks(&self) -> &dyn DockRepository {
        self.inner.docks()
    }

    fn berthings(&self) -> &dyn BerthingRepository {
        &self.berthings
    }

    fn notifications(&self) -> &dyn NotificationRepository {
        self.inner.notifications()
    }
}

struct ContendedBerthings {
    inner: InMemoryRepositoryProvider,
    stale_writes: AtomicUsize,
}

impl ContendedBerthings {
    fn count<T>(&self, result: DomainResult<T>) -> DomainResult<T> {
        if matches!(&result, Err(e) if e.is_stale_write()) {
            self.stale_writes.fetch_add(1, Ordering::SeqCst);
        }
        result
    }
}

#[async_trait]
impl BerthingRepository for ContendedBerthings {
    async fn insert_reserving_dock(&self, berthing: &Berthing) -> DomainResult<()> {
        self.inner.berthings().insert_reserving_dock(berthing).await
    }

    async fn save_transition(&self, berthing: &Berthing, claim: DockClaim) -> DomainResult<i64> {
        let result = self.inner.berthings().save_transition(berthing, claim).await;
        self.count(result)
    }

    async fn save_cargo(&self, berthing: &Berthing, cargo: &CargoDetail) -> DomainResult<i64> {
        let result = self.inner.berthings().save_cargo(berthing, cargo).await;
        self.count(result)
    }

    async fn delete(&self, berthing: &Berthing, claim: DockClaim) -> DomainResult<()> {
        let result = self.inner.berthings().delete(berthing, claim).await;
        self.count(result)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Berthing>> {
        let found = self.inner.berthings().find_by_id(id).await;
        tokio::task::yield_now().await;
        found
    }

    async fn find_by_cargo_id(&self, cargo_id: &str) -> DomainResult<Option<Berthing>> {
        let found = self.inner.berthings().find_by_cargo_id(cargo_id).await;
        tokio::task::yield_now().await;
        found
    }

    async fn find_all(
        &self,
        filter: &BerthingFilter,
        page: PaginationParams,
    ) -> DomainResult<PaginatedResult<Berthing>> {
        self.inner.berthings().find_all(filter, page).await
    }

    async fn find_in_statuses(&self, statuses: &[BerthingStatus]) -> DomainResult<Vec<Berthing>> {
        self.inner.berthings().find_in_statuses(statuses).await
    }
}

//! Berthing workflow
//!
//! Each transition is a read, authorize, validate, write cycle. The write
//! carries the version that was read; when another request got there first
//! the store answers `StaleWrite` and the cycle runs again against fresh
//! state, so the loser of a race sees the real `StateError`.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::application::events::{
    BerthingDeletedEvent, BerthingStatusChangedEvent, Event, SharedEventBus,
};
use crate::application::notifications::{Audience, NotificationFanout};
use crate::domain::{
    authorize, Action, Actor, Berthing, BerthingFilter, BerthingStatus, DockClaim, DomainError,
    DomainResult, NewBerthing, NewNotification, NotificationType, RelatedDocument,
    RepositoryProvider, Resource, SchedulePatch, UserRole,
};
use crate::shared::{retry_with_backoff, PaginatedResult, PaginationParams, RetryConfig};

/// Body of the generic update operation
#[derive(Debug, Clone, Default)]
pub struct BerthingUpdate {
    /// Only `completed` and `in_progress` are accepted
    pub status: Option<String>,
    pub schedule: SchedulePatch,
}

pub struct BerthAllocationService {
    repos: Arc<dyn RepositoryProvider>,
    fanout: NotificationFanout,
    event_bus: SharedEventBus,
    retry: RetryConfig,
}

impl BerthAllocationService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        fanout: NotificationFanout,
        event_bus: SharedEventBus,
        retry: RetryConfig,
    ) -> Self {
        Self {
            repos,
            fanout,
            event_bus,
            retry,
        }
    }

    pub async fn create(&self, new: NewBerthing, actor: &Actor) -> DomainResult<Berthing> {
        authorize(actor, Resource::Berthings, Action::Create)?;
        let berthing = Berthing::request(new, &actor.id)?;

        let ship = self
            .repos
            .ships()
            .find_by_id(&berthing.ship_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Ship", &berthing.ship_id))?;
        let dock = self
            .repos
            .docks()
            .find_by_id(&berthing.dock_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Dock", &berthing.dock_id))?;

        // Fast path only; the reservation itself is a compare-and-swap.
        if !dock.is_available() {
            return Err(DomainError::Conflict(format!(
                "Dock {} is {}",
                dock.name, dock.status
            )));
        }

        self.repos.berthings().insert_reserving_dock(&berthing).await?;
        record_transition("create");
        info!(
            berthing_id = %berthing.id,
            ship_id = %ship.id,
            dock_id = %dock.id,
            requested_by = %actor.id,
            cargo_lines = berthing.cargo_details.len(),
            "Berthing requested, dock reserved"
        );
        self.publish_status(&berthing, None, actor);

        let draft = NewNotification::new(
            NotificationType::BerthingRequest,
            "New berthing request",
            format!(
                "{} requests dock {} from {} to {}",
                ship.name,
                dock.name,
                berthing.arrival_date.to_rfc3339(),
                berthing.departure_date.to_rfc3339()
            ),
        );
        self.fanout
            .dispatch(self.about(&berthing, draft), Audience::AdministrativeRoles)
            .await;

        Ok(berthing)
    }

    pub async fn approve(&self, id: &str, actor: &Actor) -> DomainResult<Berthing> {
        let (berthing, from) = self
            .transition(id, actor, Action::Approve, "approve", |b, a| b.approve(&a.id))
            .await?;
        self.notify_creator(
            &berthing,
            NotificationType::BerthingApproved,
            "Berthing approved",
            format!("Your berthing request {} has been approved", berthing.id),
        )
        .await;
        self.publish_status(&berthing, Some(from), actor);
        Ok(berthing)
    }

    pub async fn reject(&self, id: &str, reason: &str, actor: &Actor) -> DomainResult<Berthing> {
        if reason.trim().is_empty() {
            return Err(DomainError::Validation("rejection reason is required".into()));
        }
        let (berthing, from) = self
            .transition(id, actor, Action::Reject, "reject", |b, a| {
                b.reject(&a.id, reason)
            })
            .await?;
        self.notify_creator(
            &berthing,
            NotificationType::BerthingRejected,
            "Berthing rejected",
            format!(
                "Your berthing request {} was rejected: {}",
                berthing.id,
                berthing.rejection_reason.as_deref().unwrap_or_default()
            ),
        )
        .await;
        self.publish_status(&berthing, Some(from), actor);
        Ok(berthing)
    }

    pub async fn start(&self, id: &str, actor: &Actor) -> DomainResult<Berthing> {
        let (berthing, from) = self
            .transition(id, actor, Action::Start, "start", |b, _| b.start())
            .await?;
        self.notify_creator(
            &berthing,
            NotificationType::BerthingInProgress,
            "Berthing in progress",
            format!("Operations for berthing {} have started", berthing.id),
        )
        .await;
        self.publish_status(&berthing, Some(from), actor);
        Ok(berthing)
    }

    pub async fn complete(&self, id: &str, actor: &Actor) -> DomainResult<Berthing> {
        let (berthing, from) = self
            .transition(id, actor, Action::Complete, "complete", |b, _| b.complete())
            .await?;
        self.notify_creator(
            &berthing,
            NotificationType::BerthingCompleted,
            "Berthing completed",
            format!("Berthing {} is completed and the dock released", berthing.id),
        )
        .await;
        self.publish_status(&berthing, Some(from), actor);
        Ok(berthing)
    }

    /// Status changes dispatch to the matching transition; anything else is
    /// a reschedule of a pending request.
    pub async fn update(
        &self,
        id: &str,
        update: BerthingUpdate,
        actor: &Actor,
    ) -> DomainResult<Berthing> {
        match update.status.as_deref() {
            Some(status) => {
                if !update.schedule.is_empty() {
                    return Err(DomainError::Validation(
                        "status changes cannot be combined with schedule changes".into(),
                    ));
                }
                match status.parse::<BerthingStatus>()? {
                    BerthingStatus::Completed => self.complete(id, actor).await,
                    BerthingStatus::InProgress => self.start(id, actor).await,
                    other => Err(DomainError::Validation(format!(
                        "status '{}' cannot be set through update",
                        other
                    ))),
                }
            }
            None if update.schedule.is_empty() => {
                Err(DomainError::Validation("nothing to update".into()))
            }
            None => {
                let schedule = update.schedule;
                let (berthing, _) = self
                    .transition(id, actor, Action::Reschedule, "reschedule", |b, _| {
                        b.reschedule(schedule.clone())
                    })
                    .await?;
                Ok(berthing)
            }
        }
    }

    pub async fn delete(&self, id: &str, actor: &Actor) -> DomainResult<()> {
        let (berthing, claim) = retry_with_backoff(
            self.retry.clone(),
            || self.try_delete(id, actor),
            DomainError::is_stale_write,
            "delete_berthing",
        )
        .await?;

        record_transition("delete");
        info!(berthing_id = %id, actor = %actor.id, ?claim, "Berthing deleted");

        self.event_bus.publish(Event::BerthingDeleted(BerthingDeletedEvent {
            berthing_id: berthing.id.clone(),
            dock_id: berthing.dock_id.clone(),
            released_dock: claim == DockClaim::Release,
            actor_id: actor.id.clone(),
            timestamp: Utc::now(),
        }));

        if !berthing.is_owned_by(&actor.id) {
            self.notify_creator(
                &berthing,
                NotificationType::BerthingCancelled,
                "Berthing cancelled",
                format!("Berthing {} was cancelled by port staff", berthing.id),
            )
            .await;
        }
        Ok(())
    }

    pub async fn get(&self, id: &str, actor: &Actor) -> DomainResult<Berthing> {
        let berthing = self.load(id).await?;
        authorize(actor, Resource::Berthing(&berthing), Action::Read)?;
        Ok(berthing)
    }

    /// Agents see their own requests, cargo owners the berthings carrying
    /// their cargo, everyone else the whole list.
    pub async fn list(
        &self,
        mut filter: BerthingFilter,
        page: PaginationParams,
        actor: &Actor,
    ) -> DomainResult<PaginatedResult<Berthing>> {
        match actor.role {
            UserRole::MaritimeAgent => filter.created_by = Some(actor.id.clone()),
            UserRole::CargoOwner => filter.cargo_owner_id = Some(actor.id.clone()),
            _ => {}
        }
        self.repos.berthings().find_all(&filter, page).await
    }

    async fn load(&self, id: &str) -> DomainResult<Berthing> {
        self.repos
            .berthings()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Berthing", id))
    }

    async fn transition<F>(
        &self,
        id: &str,
        actor: &Actor,
        action: Action,
        name: &'static str,
        apply: F,
    ) -> DomainResult<(Berthing, BerthingStatus)>
    where
        F: Fn(&mut Berthing, &Actor) -> DomainResult<DockClaim>,
    {
        let apply = &apply;
        let result = retry_with_backoff(
            self.retry.clone(),
            || self.try_transition(id, actor, action, apply),
            DomainError::is_stale_write,
            name,
        )
        .await?;

        record_transition(name);
        info!(
            berthing_id = %id,
            transition = name,
            from = %result.1,
            to = %result.0.status,
            actor = %actor.id,
            "Berthing transition"
        );
        Ok(result)
    }

    async fn try_transition<F>(
        &self,
        id: &str,
        actor: &Actor,
        action: Action,
        apply: &F,
    ) -> DomainResult<(Berthing, BerthingStatus)>
    where
        F: Fn(&mut Berthing, &Actor) -> DomainResult<DockClaim>,
    {
        let mut berthing = self.load(id).await?;
        authorize(actor, Resource::Berthing(&berthing), action)?;

        let from = berthing.status;
        let claim = apply(&mut berthing, actor)?;
        berthing.version = self
            .repos
            .berthings()
            .save_transition(&berthing, claim)
            .await?;
        Ok((berthing, from))
    }

    async fn try_delete(&self, id: &str, actor: &Actor) -> DomainResult<(Berthing, DockClaim)> {
        let berthing = self.load(id).await?;
        authorize(actor, Resource::Berthing(&berthing), Action::Delete)?;
        let claim = berthing.deletion_claim()?;
        self.repos.berthings().delete(&berthing, claim).await?;
        Ok((berthing, claim))
    }

    fn about(&self, berthing: &Berthing, draft: NewNotification) -> NewNotification {
        draft
            .related(RelatedDocument::Berthing(berthing.id.clone()))
            .action_url(format!("/berthings/{}", berthing.id))
    }

    async fn notify_creator(
        &self,
        berthing: &Berthing,
        kind: NotificationType,
        title: &str,
        message: String,
    ) {
        let draft = self.about(berthing, NewNotification::new(kind, title, message));
        let created = self
            .fanout
            .dispatch(draft, Audience::user(berthing.created_by.clone()))
            .await;
        if created.is_empty() {
            warn!(berthing_id = %berthing.id, notification_type = %kind, "Creator was not notified");
        }
    }

    fn publish_status(&self, berthing: &Berthing, from: Option<BerthingStatus>, actor: &Actor) {
        self.event_bus
            .publish(Event::BerthingStatusChanged(BerthingStatusChangedEvent {
                berthing_id: berthing.id.clone(),
                dock_id: berthing.dock_id.clone(),
                from,
                to: berthing.status,
                actor_id: actor.id.clone(),
                timestamp: Utc::now(),
            }));
    }
}

fn record_transition(transition: &'static str) {
    metrics::counter!("berthing_transitions_total", "transition" => transition).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::EventBus;
    use crate::domain::{
        CargoType, CargoUnit, Dock, DockStatus, NewCargo, NewDock, NewShip, NotificationFilter,
        Ship, ShipType, User,
    };
    use crate::application::test_support::{ContendedProvider, FailingInboxProvider};
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use chrono::{DateTime, TimeZone};

    struct Harness {
        repos: Arc<dyn RepositoryProvider>,
        service: BerthAllocationService,
        ship: Ship,
        dock: Dock,
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 6, 0, 0).unwrap()
    }

    async fn harness() -> Harness {
        harness_over(Arc::new(InMemoryRepositoryProvider::new())).await
    }

    async fn harness_over(repos: Arc<dyn RepositoryProvider>) -> Harness {
        let bus = Arc::new(EventBus::new());
        let fanout = NotificationFanout::new(repos.clone(), bus.clone());
        let service =
            BerthAllocationService::new(repos.clone(), fanout, bus, RetryConfig::default());

        repos
            .users()
            .save(User::new("root", "root", "root@port.local", UserRole::Admin))
            .await
            .unwrap();
        repos
            .users()
            .save(User::new(
                "pa",
                "harbour-master",
                "hm@port.local",
                UserRole::PortAuthority,
            ))
            .await
            .unwrap();

        let ship = Ship::register(
            NewShip {
                imo_number: "9321483".into(),
                name: "Maersk Elba".into(),
                ship_type: ShipType::Container,
                length: 300.0,
                gross_tonnage: 90_000.0,
                flag: "DK".into(),
                company: "Maersk".into(),
            },
            "agent-1",
        )
        .unwrap();
        repos.ships().save(ship.clone()).await.unwrap();

        let dock = Dock::register(NewDock {
            name: "Quay 7".into(),
            length: 350.0,
            max_draft: 14.5,
            location: None,
        })
        .unwrap();
        repos.docks().save(dock.clone()).await.unwrap();

        Harness {
            repos,
            service,
            ship,
            dock,
        }
    }

    impl Harness {
        fn request(&self) -> NewBerthing {
            NewBerthing {
                ship_id: self.ship.id.clone(),
                dock_id: self.dock.id.clone(),
                arrival_date: day(1),
                departure_date: day(4),
                cargo: vec![NewCargo {
                    description: "Reefer containers".into(),
                    weight: 1200.0,
                    cargo_type: CargoType::Refrigerated,
                    quantity: 60.0,
                    unit: CargoUnit::Containers,
                    cargo_owner_id: "owner-1".into(),
                    notes: None,
                }],
                documents: vec![],
                notes: None,
            }
        }

        async fn dock_status(&self) -> DockStatus {
            self.repos
                .docks()
                .find_by_id(&self.dock.id)
                .await
                .unwrap()
                .unwrap()
                .status
        }

        async fn inbox(&self, user_id: &str, kind: NotificationType) -> usize {
            let filter = NotificationFilter {
                notification_type: Some(kind),
                ..Default::default()
            };
            self.repos
                .notifications()
                .find_for_user(user_id, &filter, PaginationParams::default())
                .await
                .unwrap()
                .items
                .len()
        }
    }

    fn agent() -> Actor {
        Actor::new("agent-1", UserRole::MaritimeAgent)
    }

    fn admin() -> Actor {
        Actor::new("root", UserRole::Admin)
    }

    #[tokio::test]
    async fn create_reserves_dock_and_notifies_staff() {
        let h = harness().await;
        let berthing = h.service.create(h.request(), &agent()).await.unwrap();

        assert_eq!(berthing.status, BerthingStatus::Pending);
        assert_eq!(berthing.created_by, "agent-1");
        assert_eq!(h.dock_status().await, DockStatus::Occupied);
        assert_eq!(h.inbox("root", NotificationType::BerthingRequest).await, 1);
        assert_eq!(h.inbox("pa", NotificationType::BerthingRequest).await, 1);
        assert_eq!(h.inbox("agent-1", NotificationType::BerthingRequest).await, 0);
    }

    #[tokio::test]
    async fn second_request_for_reserved_dock_conflicts() {
        let h = harness().await;
        h.service.create(h.request(), &agent()).await.unwrap();

        let err = h.service.create(h.request(), &agent()).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let all = h
            .service
            .list(BerthingFilter::default(), PaginationParams::default(), &admin())
            .await
            .unwrap();
        assert_eq!(all.items.len(), 1);
    }

    #[tokio::test]
    async fn create_checks_role_and_references() {
        let h = harness().await;
        let owner = Actor::new("owner-1", UserRole::CargoOwner);
        assert!(matches!(
            h.service.create(h.request(), &owner).await,
            Err(DomainError::Forbidden(_))
        ));

        let mut unknown_ship = h.request();
        unknown_ship.ship_id = "missing".into();
        assert!(matches!(
            h.service.create(unknown_ship, &agent()).await,
            Err(DomainError::NotFound { .. })
        ));

        let mut backwards = h.request();
        backwards.departure_date = day(1);
        assert!(matches!(
            h.service.create(backwards, &agent()).await,
            Err(DomainError::Validation(_))
        ));
        assert_eq!(h.dock_status().await, DockStatus::Available);
    }

    #[tokio::test]
    async fn dock_under_maintenance_cannot_be_requested() {
        let h = harness().await;
        h.repos.docks().set_maintenance(&h.dock.id, true).await.unwrap();

        assert!(matches!(
            h.service.create(h.request(), &agent()).await,
            Err(DomainError::Conflict(_))
        ));
        assert_eq!(h.dock_status().await, DockStatus::Maintenance);
    }

    #[tokio::test]
    async fn full_lifecycle_releases_dock() {
        let h = harness().await;
        let created = h.service.create(h.request(), &agent()).await.unwrap();

        let approved = h.service.approve(&created.id, &admin()).await.unwrap();
        assert_eq!(approved.status, BerthingStatus::Approved);
        assert_eq!(approved.approved_by.as_deref(), Some("root"));
        assert_eq!(approved.version, created.version + 1);
        assert_eq!(h.dock_status().await, DockStatus::Occupied);

        let started = h.service.start(&created.id, &admin()).await.unwrap();
        assert_eq!(started.status, BerthingStatus::InProgress);
        assert_eq!(h.dock_status().await, DockStatus::Occupied);

        let done = h.service.complete(&created.id, &agent()).await.unwrap();
        assert_eq!(done.status, BerthingStatus::Completed);
        assert_eq!(h.dock_status().await, DockStatus::Available);

        assert_eq!(h.inbox("agent-1", NotificationType::BerthingApproved).await, 1);
        assert_eq!(h.inbox("agent-1", NotificationType::BerthingInProgress).await, 1);
        assert_eq!(h.inbox("agent-1", NotificationType::BerthingCompleted).await, 1);

        // The dock can be booked again
        h.service.create(h.request(), &agent()).await.unwrap();
        assert_eq!(h.dock_status().await, DockStatus::Occupied);
    }

    #[tokio::test]
    async fn only_staff_run_approval_transitions() {
        let h = harness().await;
        let created = h.service.create(h.request(), &agent()).await.unwrap();

        assert!(matches!(
            h.service.approve(&created.id, &agent()).await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            h.service.reject(&created.id, "no", &agent()).await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            h.service.approve("missing", &admin()).await,
            Err(DomainError::NotFound { .. })
        ));
        // Starting a pending berthing is out of order
        assert!(matches!(
            h.service.start(&created.id, &admin()).await,
            Err(DomainError::StateError(_))
        ));
    }

    #[tokio::test]
    async fn reject_requires_reason_and_releases_dock() {
        let h = harness().await;
        let created = h.service.create(h.request(), &agent()).await.unwrap();

        assert!(matches!(
            h.service.reject(&created.id, "   ", &admin()).await,
            Err(DomainError::Validation(_))
        ));
        assert_eq!(h.dock_status().await, DockStatus::Occupied);

        let rejected = h
            .service
            .reject(&created.id, "Draft exceeds quay limit", &admin())
            .await
            .unwrap();
        assert_eq!(rejected.status, BerthingStatus::Rejected);
        assert_eq!(rejected.rejected_by.as_deref(), Some("root"));
        assert_eq!(
            rejected.rejection_reason.as_deref(),
            Some("Draft exceeds quay limit")
        );
        assert_eq!(h.dock_status().await, DockStatus::Available);
        assert_eq!(h.inbox("agent-1", NotificationType::BerthingRejected).await, 1);

        assert!(matches!(
            h.service.approve(&created.id, &admin()).await,
            Err(DomainError::StateError(_))
        ));
    }

    #[tokio::test]
    async fn update_dispatches_on_status() {
        let h = harness().await;
        let created = h.service.create(h.request(), &agent()).await.unwrap();

        let rescheduled = h
            .service
            .update(
                &created.id,
                BerthingUpdate {
                    status: None,
                    schedule: SchedulePatch {
                        departure_date: Some(day(6)),
                        notes: Some("Awaiting pilot".into()),
                        ..Default::default()
                    },
                },
                &agent(),
            )
            .await
            .unwrap();
        assert_eq!(rescheduled.departure_date, day(6));
        assert_eq!(rescheduled.status, BerthingStatus::Pending);

        let mixed = BerthingUpdate {
            status: Some("completed".into()),
            schedule: SchedulePatch {
                notes: Some("x".into()),
                ..Default::default()
            },
        };
        assert!(matches!(
            h.service.update(&created.id, mixed, &agent()).await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            h.service
                .update(&created.id, BerthingUpdate::default(), &agent())
                .await,
            Err(DomainError::Validation(_))
        ));

        let approve_via_update = BerthingUpdate {
            status: Some("approved".into()),
            ..Default::default()
        };
        assert!(matches!(
            h.service.update(&created.id, approve_via_update, &admin()).await,
            Err(DomainError::Validation(_))
        ));

        h.service.approve(&created.id, &admin()).await.unwrap();
        let in_progress = BerthingUpdate {
            status: Some("in_progress".into()),
            ..Default::default()
        };
        let started = h
            .service
            .update(&created.id, in_progress, &admin())
            .await
            .unwrap();
        assert_eq!(started.status, BerthingStatus::InProgress);

        let complete = BerthingUpdate {
            status: Some("completed".into()),
            ..Default::default()
        };
        let done = h
            .service
            .update(&created.id, complete, &agent())
            .await
            .unwrap();
        assert_eq!(done.status, BerthingStatus::Completed);
        assert_eq!(h.dock_status().await, DockStatus::Available);
    }

    #[tokio::test]
    async fn other_agents_cannot_touch_a_request() {
        let h = harness().await;
        let created = h.service.create(h.request(), &agent()).await.unwrap();
        let stranger = Actor::new("agent-2", UserRole::MaritimeAgent);

        assert!(matches!(
            h.service.get(&created.id, &stranger).await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            h.service.delete(&created.id, &stranger).await,
            Err(DomainError::Forbidden(_))
        ));
        let owner = Actor::new("owner-1", UserRole::CargoOwner);
        assert_eq!(h.service.get(&created.id, &owner).await.unwrap().id, created.id);
    }

    #[tokio::test]
    async fn delete_releases_dock_and_notifies_creator_when_staff_cancel() {
        let h = harness().await;
        let own = h.service.create(h.request(), &agent()).await.unwrap();
        h.service.delete(&own.id, &agent()).await.unwrap();
        assert_eq!(h.dock_status().await, DockStatus::Available);
        assert_eq!(h.inbox("agent-1", NotificationType::BerthingCancelled).await, 0);
        assert!(matches!(
            h.service.get(&own.id, &admin()).await,
            Err(DomainError::NotFound { .. })
        ));

        let approved = h.service.create(h.request(), &agent()).await.unwrap();
        h.service.approve(&approved.id, &admin()).await.unwrap();
        h.service.delete(&approved.id, &admin()).await.unwrap();
        assert_eq!(h.dock_status().await, DockStatus::Available);
        assert_eq!(h.inbox("agent-1", NotificationType::BerthingCancelled).await, 1);
    }

    #[tokio::test]
    async fn delete_is_refused_once_alongside() {
        let h = harness().await;
        let created = h.service.create(h.request(), &agent()).await.unwrap();
        h.service.approve(&created.id, &admin()).await.unwrap();
        h.service.start(&created.id, &admin()).await.unwrap();

        assert!(matches!(
            h.service.delete(&created.id, &admin()).await,
            Err(DomainError::StateError(_))
        ));
        assert_eq!(h.dock_status().await, DockStatus::Occupied);
    }

    #[tokio::test]
    async fn deleting_rejected_request_leaves_new_reservation_alone() {
        let h = harness().await;
        let rejected = h.service.create(h.request(), &agent()).await.unwrap();
        h.service
            .reject(&rejected.id, "Closed for dredging", &admin())
            .await
            .unwrap();
        let current = h.service.create(h.request(), &agent()).await.unwrap();

        h.service.delete(&rejected.id, &agent()).await.unwrap();
        assert_eq!(h.dock_status().await, DockStatus::Occupied);
        assert_eq!(
            h.service.get(&current.id, &agent()).await.unwrap().status,
            BerthingStatus::Pending
        );
    }

    #[tokio::test]
    async fn list_is_scoped_by_role() {
        let h = harness().await;
        let mine = h.service.create(h.request(), &agent()).await.unwrap();
        h.service.reject(&mine.id, "Full", &admin()).await.unwrap();

        let mut other = h.request();
        other.cargo[0].cargo_owner_id = "owner-2".into();
        h.service
            .create(other, &Actor::new("agent-2", UserRole::MaritimeAgent))
            .await
            .unwrap();

        let page = PaginationParams::default();
        let as_agent = h
            .service
            .list(BerthingFilter::default(), page, &agent())
            .await
            .unwrap();
        assert_eq!(as_agent.items.len(), 1);
        assert_eq!(as_agent.items[0].id, mine.id);

        let as_owner = h
            .service
            .list(
                BerthingFilter::default(),
                page,
                &Actor::new("owner-2", UserRole::CargoOwner),
            )
            .await
            .unwrap();
        assert_eq!(as_owner.items.len(), 1);
        assert_ne!(as_owner.items[0].id, mine.id);

        // A caller-supplied owner filter cannot widen an agent's view
        let widened = BerthingFilter {
            created_by: Some("agent-2".into()),
            ..Default::default()
        };
        let still_mine = h.service.list(widened, page, &agent()).await.unwrap();
        assert_eq!(still_mine.items.len(), 1);
        assert_eq!(still_mine.items[0].id, mine.id);

        let pending_only = BerthingFilter {
            status: Some(BerthingStatus::Pending),
            ..Default::default()
        };
        let staff = h.service.list(pending_only, page, &admin()).await.unwrap();
        assert_eq!(staff.items.len(), 1);
    }

    #[tokio::test]
    async fn transitions_are_published_on_the_bus() {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
        let bus = Arc::new(EventBus::new());
        let mut events = bus.subscribe();
        let h = harness().await;
        let service = BerthAllocationService::new(
            repos.clone(),
            NotificationFanout::new(repos.clone(), bus.clone()),
            bus,
            RetryConfig::default(),
        );
        repos.ships().save(h.ship.clone()).await.unwrap();
        repos.docks().save(h.dock.clone()).await.unwrap();

        let created = service.create(h.request(), &agent()).await.unwrap();
        service.approve(&created.id, &admin()).await.unwrap();

        let mut seen = Vec::new();
        while seen.len() < 2 {
            let msg = events.recv().await.unwrap();
            if let Event::BerthingStatusChanged(e) = msg.event {
                seen.push((e.from, e.to));
            }
        }
        assert_eq!(
            seen,
            vec![
                (None, BerthingStatus::Pending),
                (Some(BerthingStatus::Pending), BerthingStatus::Approved),
            ]
        );
    }

    #[tokio::test]
    async fn inbox_outage_does_not_fail_transitions() {
        let h = harness_over(Arc::new(FailingInboxProvider::new())).await;

        let created = h.service.create(h.request(), &agent()).await.unwrap();
        assert_eq!(created.status, BerthingStatus::Pending);
        assert_eq!(h.dock_status().await, DockStatus::Occupied);

        let approved = h.service.approve(&created.id, &admin()).await.unwrap();
        assert_eq!(approved.status, BerthingStatus::Approved);
        assert_eq!(h.dock_status().await, DockStatus::Occupied);

        let stored = h.service.get(&created.id, &agent()).await.unwrap();
        assert_eq!(stored.status, BerthingStatus::Approved);
        assert!(h.repos.notifications().count_unread("agent-1").await.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn racing_approve_and_reject_have_one_winner() {
        let contended = Arc::new(ContendedProvider::new());
        let h = harness_over(contended.clone()).await;
        let berthing = h.service.create(h.request(), &agent()).await.unwrap();
        let harbour_master = Actor::new("pa", UserRole::PortAuthority);
        let admin_actor = admin();

        let (approved, rejected) = tokio::join!(
            h.service.approve(&berthing.id, &admin_actor),
            h.service.reject(&berthing.id, "Draft exceeds quay limit", &harbour_master),
        );

        assert!(contended.stale_writes() >= 1);
        let (winner, loser) = match (approved, rejected) {
            (Ok(won), Err(lost)) | (Err(lost), Ok(won)) => (won, lost),
            other => panic!("expected exactly one winner, got {other:?}"),
        };
        assert!(matches!(loser, DomainError::StateError(_)), "{loser:?}");

        let stored = h.service.get(&berthing.id, &admin()).await.unwrap();
        assert_eq!(stored.status, winner.status);
        let expected_dock = match stored.status {
            BerthingStatus::Approved => DockStatus::Occupied,
            BerthingStatus::Rejected => DockStatus::Available,
            other => panic!("unexpected status {other}"),
        };
        assert_eq!(h.dock_status().await, expected_dock);
    }
}

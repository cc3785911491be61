//! Cargo clearance sub-workflow
//!
//! Cargo lines live inside their berthing, so every customs write is a
//! write of the parent and is guarded by the parent's version.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::application::events::{CustomsStatusChangedEvent, Event, SharedEventBus};
use crate::application::notifications::{Audience, NotificationFanout};
use crate::domain::{
    authorize, Action, Actor, AuditEntry, Berthing, BerthingStatus, CargoDetail, CustomsStatus,
    DomainError, DomainResult, NewNotification, NotificationType, RelatedDocument,
    RepositoryProvider, Resource,
};
use crate::shared::{retry_with_backoff, RetryConfig};

/// A cargo line awaiting clearance, with its berthing context
#[derive(Debug, Clone)]
pub struct ClearanceItem {
    pub cargo: CargoDetail,
    pub berthing_id: String,
    pub berthing_status: BerthingStatus,
    pub ship_id: String,
    pub dock_id: String,
    pub arrival_date: DateTime<Utc>,
    pub departure_date: DateTime<Utc>,
}

pub struct ClearanceService {
    repos: Arc<dyn RepositoryProvider>,
    fanout: NotificationFanout,
    event_bus: SharedEventBus,
    retry: RetryConfig,
}

impl ClearanceService {
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

    pub async fn update_customs_status(
        &self,
        cargo_id: &str,
        status: &str,
        notes: Option<String>,
        actor: &Actor,
    ) -> DomainResult<CargoDetail> {
        let next: CustomsStatus = status.parse()?;
        let notes = notes.filter(|n| !n.trim().is_empty());

        let (berthing_id, from, cargo) = retry_with_backoff(
            self.retry.clone(),
            || self.try_update(cargo_id, next, notes.clone(), actor),
            DomainError::is_stale_write,
            "update_customs_status",
        )
        .await?;

        metrics::counter!("customs_updates_total", "status" => next.as_str()).increment(1);
        info!(
            cargo_id = %cargo_id,
            berthing_id = %berthing_id,
            from = %from,
            to = %next,
            actor = %actor.id,
            "Customs status updated"
        );

        self.event_bus
            .publish(Event::CustomsStatusChanged(CustomsStatusChangedEvent {
                cargo_id: cargo.id.clone(),
                berthing_id: berthing_id.clone(),
                from,
                to: next,
                actor_id: actor.id.clone(),
                timestamp: Utc::now(),
            }));

        let draft = NewNotification::new(
            NotificationType::CustomsUpdate,
            "Customs status updated",
            format!(
                "Cargo '{}' moved from {} to {}",
                cargo.description, from, next
            ),
        )
        .related(RelatedDocument::Cargo(cargo.id.clone()))
        .action_url(format!("/berthings/{}", berthing_id));
        self.fanout
            .dispatch(draft, Audience::user(cargo.cargo_owner_id.clone()))
            .await;

        Ok(cargo)
    }

    async fn try_update(
        &self,
        cargo_id: &str,
        next: CustomsStatus,
        notes: Option<String>,
        actor: &Actor,
    ) -> DomainResult<(String, CustomsStatus, CargoDetail)> {
        let mut berthing = self.load_parent(cargo_id).await?;
        let cargo = berthing
            .cargo(cargo_id)
            .ok_or_else(|| DomainError::not_found("Cargo", cargo_id))?;
        authorize(
            actor,
            Resource::Cargo {
                berthing: &berthing,
                cargo,
            },
            Action::UpdateCustoms,
        )?;
        let from = cargo.customs_status;

        let cargo = berthing
            .cargo_mut(cargo_id)
            .ok_or_else(|| DomainError::not_found("Cargo", cargo_id))?;
        cargo.apply_customs_status(next, notes, &actor.id, Utc::now())?;
        let cargo = cargo.clone();

        self.repos.berthings().save_cargo(&berthing, &cargo).await?;
        Ok((berthing.id, from, cargo))
    }

    /// Lines not yet cleared or held on berthings that are alongside or about to be
    pub async fn cargo_for_clearance(&self, actor: &Actor) -> DomainResult<Vec<ClearanceItem>> {
        authorize(actor, Resource::ClearanceQueue, Action::Read)?;

        let berthings = self
            .repos
            .berthings()
            .find_in_statuses(&[BerthingStatus::Approved, BerthingStatus::InProgress])
            .await?;

        Ok(berthings
            .into_iter()
            .flat_map(|b| {
                let Berthing {
                    id,
                    status,
                    ship_id,
                    dock_id,
                    arrival_date,
                    departure_date,
                    cargo_details,
                    ..
                } = b;
                cargo_details
                    .into_iter()
                    .filter(|c| c.customs_status.awaits_clearance())
                    .map(move |cargo| ClearanceItem {
                        cargo,
                        berthing_id: id.clone(),
                        berthing_status: status,
                        ship_id: ship_id.clone(),
                        dock_id: dock_id.clone(),
                        arrival_date,
                        departure_date,
                    })
            })
            .collect())
    }

    pub async fn clearance_history(
        &self,
        cargo_id: &str,
        actor: &Actor,
    ) -> DomainResult<Vec<AuditEntry>> {
        let berthing = self.load_parent(cargo_id).await?;
        let cargo = berthing
            .cargo(cargo_id)
            .ok_or_else(|| DomainError::not_found("Cargo", cargo_id))?;
        authorize(
            actor,
            Resource::Cargo {
                berthing: &berthing,
                cargo,
            },
            Action::Read,
        )?;
        Ok(cargo.audit_trail.clone())
    }

    async fn load_parent(&self, cargo_id: &str) -> DomainResult<Berthing> {
        self.repos
            .berthings()
            .find_by_cargo_id(cargo_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Cargo", cargo_id))
    }
}

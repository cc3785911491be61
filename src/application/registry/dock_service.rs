use std::sync::Arc;

use tracing::info;

use crate::domain::{
    authorize, Action, Actor, Dock, DockStatus, DomainError, DomainResult, NewDock,
    RepositoryProvider, Resource,
};

pub struct DockService {
    repos: Arc<dyn RepositoryProvider>,
}

impl DockService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn register(&self, new: NewDock, actor: &Actor) -> DomainResult<Dock> {
        authorize(actor, Resource::Dock, Action::Create)?;
        let dock = Dock::register(new)?;

        if self.repos.docks().find_by_name(&dock.name).await?.is_some() {
            return Err(DomainError::Conflict(format!(
                "Dock '{}' already exists",
                dock.name
            )));
        }

        self.repos.docks().save(dock.clone()).await?;
        info!(dock_id = %dock.id, name = %dock.name, "Dock registered");
        Ok(dock)
    }

    pub async fn get(&self, id: &str) -> DomainResult<Dock> {
        self.repos
            .docks()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Dock", id))
    }

    pub async fn list(&self, status: Option<DockStatus>) -> DomainResult<Vec<Dock>> {
        self.repos.docks().find_all(status).await
    }

    /// Occupancy belongs to the allocation engine; staff only toggle maintenance.
    pub async fn set_maintenance(
        &self,
        id: &str,
        enabled: bool,
        actor: &Actor,
    ) -> DomainResult<Dock> {
        authorize(actor, Resource::Dock, Action::Manage)?;
        let dock = self.repos.docks().set_maintenance(id, enabled).await?;
        info!(dock_id = %id, enabled, actor = %actor.id, "Dock maintenance toggled");
        Ok(dock)
    }

    pub async fn delete(&self, id: &str, actor: &Actor) -> DomainResult<()> {
        authorize(actor, Resource::Dock, Action::Delete)?;
        self.repos.docks().delete(id).await?;
        info!(dock_id = %id, actor = %actor.id, "Dock deleted");
        Ok(())
    }
}

use std::sync::Arc;

use tracing::info;

use crate::domain::{
    authorize, Action, Actor, DomainError, DomainResult, NewShip, RepositoryProvider, Resource,
    Ship,
};
use crate::shared::{PaginatedResult, PaginationParams};

pub struct ShipService {
    repos: Arc<dyn RepositoryProvider>,
}

impl ShipService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn register(&self, new: NewShip, actor: &Actor) -> DomainResult<Ship> {
        authorize(actor, Resource::Ship, Action::Create)?;
        let ship = Ship::register(new, &actor.id)?;

        if self.repos.ships().find_by_imo(&ship.imo_number).await?.is_some() {
            return Err(DomainError::Conflict(format!(
                "Ship with IMO {} is already registered",
                ship.imo_number
            )));
        }

        self.repos.ships().save(ship.clone()).await?;
        info!(ship_id = %ship.id, imo = %ship.imo_number, registered_by = %actor.id, "Ship registered");
        Ok(ship)
    }

    pub async fn get(&self, id: &str) -> DomainResult<Ship> {
        self.repos
            .ships()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Ship", id))
    }

    pub async fn list(&self, page: PaginationParams) -> DomainResult<PaginatedResult<Ship>> {
        self.repos.ships().find_all(page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ShipType, UserRole};
    use crate::infrastructure::storage::InMemoryRepositoryProvider;

    fn new_ship() -> NewShip {
        NewShip {
            imo_number: "9074729".into(),
            name: "Aurora".into(),
            ship_type: ShipType::Tanker,
            length: 250.0,
            gross_tonnage: 60_000.0,
            flag: "NO".into(),
            company: "Fjord".into(),
        }
    }

    #[tokio::test]
    async fn duplicate_imo_is_conflict() {
        let service = ShipService::new(Arc::new(InMemoryRepositoryProvider::new()));
        let agent = Actor::new("agent", UserRole::MaritimeAgent);

        let ship = service.register(new_ship(), &agent).await.unwrap();
        assert_eq!(service.get(&ship.id).await.unwrap().name, "Aurora");

        let err = service.register(new_ship(), &agent).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(service.list(PaginationParams::default()).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn cargo_owner_cannot_register() {
        let service = ShipService::new(Arc::new(InMemoryRepositoryProvider::new()));
        let owner = Actor::new("o", UserRole::CargoOwner);
        let err = service.register(new_ship(), &owner).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }
}

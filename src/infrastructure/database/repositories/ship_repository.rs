//! SeaORM implementation of ShipRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::debug;

use super::{db_err, parse_column};
use crate::domain::{DomainResult, Ship, ShipRepository};
use crate::infrastructure::database::entities::ship;
use crate::shared::{PaginatedResult, PaginationParams};

pub struct SeaOrmShipRepository {
    db: DatabaseConnection,
}

impl SeaOrmShipRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: ship::Model) -> DomainResult<Ship> {
    Ok(Ship {
        ship_type: parse_column(&m.ship_type, "ships.ship_type")?,
        id: m.id,
        imo_number: m.imo_number,
        name: m.name,
        length: m.length,
        gross_tonnage: m.gross_tonnage,
        flag: m.flag,
        company: m.company,
        registered_by: m.registered_by,
        created_at: m.created_at,
    })
}

#[async_trait]
impl ShipRepository for SeaOrmShipRepository {
    async fn save(&self, s: Ship) -> DomainResult<()> {
        debug!(ship_id = %s.id, imo = %s.imo_number, "Saving ship");

        let model = ship::ActiveModel {
            id: Set(s.id),
            imo_number: Set(s.imo_number),
            name: Set(s.name),
            ship_type: Set(s.ship_type.as_str().to_string()),
            length: Set(s.length),
            gross_tonnage: Set(s.gross_tonnage),
            flag: Set(s.flag),
            company: Set(s.company),
            registered_by: Set(s.registered_by),
            created_at: Set(s.created_at),
        };
        model.insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Ship>> {
        ship::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_by_imo(&self, imo_number: &str) -> DomainResult<Option<Ship>> {
        ship::Entity::find()
            .filter(ship::Column::ImoNumber.eq(imo_number))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_all(&self, page: PaginationParams) -> DomainResult<PaginatedResult<Ship>> {
        let query = ship::Entity::find().order_by_desc(ship::Column::CreatedAt);
        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let items = query
            .offset(page.offset())
            .limit(page.limit as u64)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(model_to_domain)
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(PaginatedResult::new(items, total, page.page, page.limit))
    }
}

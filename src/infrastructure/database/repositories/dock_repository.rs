//! SeaORM implementation of DockRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::debug;

use super::{db_err, parse_column};
use crate::domain::{Dock, DockRepository, DockStatus, DomainError, DomainResult};
use crate::infrastructure::database::entities::{berthing, dock};

pub struct SeaOrmDockRepository {
    db: DatabaseConnection,
}

impl SeaOrmDockRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: dock::Model) -> DomainResult<Dock> {
    Ok(Dock {
        status: parse_column(&m.status, "docks.status")?,
        id: m.id,
        name: m.name,
        length: m.length,
        max_draft: m.max_draft,
        location: m.location,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

#[async_trait]
impl DockRepository for SeaOrmDockRepository {
    async fn save(&self, d: Dock) -> DomainResult<()> {
        debug!(dock_id = %d.id, name = %d.name, "Saving dock");

        let model = dock::ActiveModel {
            id: Set(d.id),
            name: Set(d.name),
            length: Set(d.length),
            max_draft: Set(d.max_draft),
            location: Set(d.location),
            status: Set(d.status.as_str().to_string()),
            created_at: Set(d.created_at),
            updated_at: Set(d.updated_at),
        };
        model.insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Dock>> {
        dock::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_by_name(&self, name: &str) -> DomainResult<Option<Dock>> {
        dock::Entity::find()
            .filter(dock::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_all(&self, status: Option<DockStatus>) -> DomainResult<Vec<Dock>> {
        let mut query = dock::Entity::find().order_by_asc(dock::Column::Name);
        if let Some(status) = status {
            query = query.filter(dock::Column::Status.eq(status.as_str()));
        }
        query
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }

    async fn set_maintenance(&self, id: &str, enabled: bool) -> DomainResult<Dock> {
        let (from, to) = if enabled {
            (DockStatus::Available, DockStatus::Maintenance)
        } else {
            (DockStatus::Maintenance, DockStatus::Available)
        };

        let result = dock::Entity::update_many()
            .col_expr(dock::Column::Status, Expr::value(to.as_str()))
            .col_expr(dock::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(dock::Column::Id.eq(id))
            .filter(dock::Column::Status.eq(from.as_str()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Dock", id))?;
        if result.rows_affected == 0 && current.status != to {
            return Err(DomainError::Conflict(format!(
                "Dock {} is {}",
                current.name, current.status
            )));
        }
        Ok(current)
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let current = dock::Entity::find_by_id(id.to_string())
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Dock", id))?;
        if current.status == DockStatus::Occupied.as_str() {
            return Err(DomainError::Conflict(format!(
                "Dock {} is occupied",
                current.name
            )));
        }

        let references = berthing::Entity::find()
            .filter(berthing::Column::DockId.eq(id))
            .count(&txn)
            .await
            .map_err(db_err)?;
        if references > 0 {
            return Err(DomainError::Conflict(format!(
                "Dock {} is referenced by {} berthings",
                current.name, references
            )));
        }

        dock::Entity::delete_by_id(id.to_string())
            .exec(&txn)
            .await
            .map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;
        Ok(())
    }
}

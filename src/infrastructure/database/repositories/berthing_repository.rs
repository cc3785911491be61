//! SeaORM implementation of BerthingRepository
//!
//! Every write runs in one transaction together with its dock claim.
//! Dropping an uncommitted transaction rolls it back, so an early return
//! or a cancelled caller leaves nothing behind.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
    TransactionTrait,
};
use tracing::debug;

use super::{db_err, json_err, parse_column};
use crate::domain::{
    AuditEntry, Berthing, BerthingFilter, BerthingRepository, BerthingStatus, CargoDetail,
    DockClaim, DocumentRef, DomainError, DomainResult,
};
use crate::infrastructure::database::entities::{berthing, cargo_item, dock};
use crate::shared::{PaginatedResult, PaginationParams};

pub struct SeaOrmBerthingRepository {
    db: DatabaseConnection,
}

impl SeaOrmBerthingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Dock claim ──────────────────────────────────────────────────

/// The single place a berthing write changes dock status
async fn apply_dock_claim<C: ConnectionTrait>(
    conn: &C,
    dock_id: &str,
    claim: DockClaim,
) -> DomainResult<()> {
    let Some(target) = claim.target_status() else {
        return Ok(());
    };

    let mut update = dock::Entity::update_many()
        .col_expr(dock::Column::Status, Expr::value(target.as_str()))
        .col_expr(dock::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(dock::Column::Id.eq(dock_id));
    if claim == DockClaim::Reserve {
        update = update.filter(dock::Column::Status.eq("available"));
    }
    let result = update.exec(conn).await.map_err(db_err)?;

    if claim == DockClaim::Reserve && result.rows_affected == 0 {
        let current = dock::Entity::find_by_id(dock_id.to_string())
            .one(conn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Dock", dock_id))?;
        return Err(DomainError::Conflict(format!(
            "Dock {} is {}",
            current.name, current.status
        )));
    }
    debug!(dock_id, ?claim, "Dock claim applied");
    Ok(())
}

// ── Conversion helpers ──────────────────────────────────────────

fn berthing_active(b: &Berthing, version: i64) -> DomainResult<berthing::ActiveModel> {
    Ok(berthing::ActiveModel {
        id: Set(b.id.clone()),
        ship_id: Set(b.ship_id.clone()),
        dock_id: Set(b.dock_id.clone()),
        arrival_date: Set(b.arrival_date),
        departure_date: Set(b.departure_date),
        status: Set(b.status.as_str().to_string()),
        documents: Set(serde_json::to_string(&b.documents).map_err(json_err)?),
        notes: Set(b.notes.clone()),
        created_by: Set(b.created_by.clone()),
        approved_by: Set(b.approved_by.clone()),
        rejected_by: Set(b.rejected_by.clone()),
        rejection_reason: Set(b.rejection_reason.clone()),
        version: Set(version),
        created_at: Set(b.created_at),
        updated_at: Set(b.updated_at),
    })
}

fn cargo_active(
    c: &CargoDetail,
    berthing_id: &str,
    position: usize,
) -> DomainResult<cargo_item::ActiveModel> {
    Ok(cargo_item::ActiveModel {
        id: Set(c.id.clone()),
        berthing_id: Set(berthing_id.to_string()),
        position: Set(position as i32),
        description: Set(c.description.clone()),
        weight: Set(c.weight),
        cargo_type: Set(c.cargo_type.as_str().to_string()),
        quantity: Set(c.quantity),
        unit: Set(c.unit.as_str().to_string()),
        cargo_owner_id: Set(c.cargo_owner_id.clone()),
        customs_status: Set(c.customs_status.as_str().to_string()),
        notes: Set(c.notes.clone()),
        processed_by: Set(c.processed_by.clone()),
        cleared_by: Set(c.cleared_by.clone()),
        cleared_at: Set(c.cleared_at),
        audit_trail: Set(serde_json::to_string(&c.audit_trail).map_err(json_err)?),
    })
}

fn cargo_to_domain(m: cargo_item::Model) -> DomainResult<CargoDetail> {
    let audit_trail: Vec<AuditEntry> = serde_json::from_str(&m.audit_trail).map_err(json_err)?;
    Ok(CargoDetail {
        cargo_type: parse_column(&m.cargo_type, "cargo_items.cargo_type")?,
        unit: parse_column(&m.unit, "cargo_items.unit")?,
        customs_status: parse_column(&m.customs_status, "cargo_items.customs_status")?,
        id: m.id,
        description: m.description,
        weight: m.weight,
        quantity: m.quantity,
        cargo_owner_id: m.cargo_owner_id,
        notes: m.notes,
        processed_by: m.processed_by,
        cleared_by: m.cleared_by,
        cleared_at: m.cleared_at,
        audit_trail,
    })
}

fn berthing_to_domain(
    m: berthing::Model,
    cargo_details: Vec<CargoDetail>,
) -> DomainResult<Berthing> {
    let documents: Vec<DocumentRef> = serde_json::from_str(&m.documents).map_err(json_err)?;
    Ok(Berthing {
        status: parse_column(&m.status, "berthings.status")?,
        id: m.id,
        ship_id: m.ship_id,
        dock_id: m.dock_id,
        arrival_date: m.arrival_date,
        departure_date: m.departure_date,
        cargo_details,
        documents,
        notes: m.notes,
        created_by: m.created_by,
        approved_by: m.approved_by,
        rejected_by: m.rejected_by,
        rejection_reason: m.rejection_reason,
        version: m.version,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn stale(b: &Berthing) -> DomainError {
    DomainError::StaleWrite {
        entity: "Berthing",
        id: b.id.clone(),
    }
}

impl SeaOrmBerthingRepository {
    /// Attach cargo lines to berthing rows with one extra query
    async fn hydrate(&self, models: Vec<berthing::Model>) -> DomainResult<Vec<Berthing>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();
        let mut cargo_by_berthing: HashMap<String, Vec<CargoDetail>> = HashMap::new();
        for item in cargo_item::Entity::find()
            .filter(cargo_item::Column::BerthingId.is_in(ids))
            .order_by_asc(cargo_item::Column::Position)
            .all(&self.db)
            .await
            .map_err(db_err)?
        {
            let berthing_id = item.berthing_id.clone();
            cargo_by_berthing
                .entry(berthing_id)
                .or_default()
                .push(cargo_to_domain(item)?);
        }

        models
            .into_iter()
            .map(|m| {
                let cargo = cargo_by_berthing.remove(&m.id).unwrap_or_default();
                berthing_to_domain(m, cargo)
            })
            .collect()
    }

    fn filtered(filter: &BerthingFilter) -> Select<berthing::Entity> {
        let mut query = berthing::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(berthing::Column::Status.eq(status.as_str()));
        }
        if let Some(dock_id) = &filter.dock_id {
            query = query.filter(berthing::Column::DockId.eq(dock_id.as_str()));
        }
        if let Some(ship_id) = &filter.ship_id {
            query = query.filter(berthing::Column::ShipId.eq(ship_id.as_str()));
        }
        if let Some(created_by) = &filter.created_by {
            query = query.filter(berthing::Column::CreatedBy.eq(created_by.as_str()));
        }
        if let Some(owner) = &filter.cargo_owner_id {
            query = query.filter(
                berthing::Column::Id.in_subquery(
                    Query::select()
                        .column(cargo_item::Column::BerthingId)
                        .from(cargo_item::Entity)
                        .and_where(cargo_item::Column::CargoOwnerId.eq(owner.as_str()))
                        .to_owned(),
                ),
            );
        }
        query
    }
}

// ── BerthingRepository impl ─────────────────────────────────────

#[async_trait]
impl BerthingRepository for SeaOrmBerthingRepository {
    async fn insert_reserving_dock(&self, b: &Berthing) -> DomainResult<()> {
        debug!(berthing_id = %b.id, dock_id = %b.dock_id, "Inserting berthing");
        let txn = self.db.begin().await.map_err(db_err)?;

        apply_dock_claim(&txn, &b.dock_id, DockClaim::Reserve).await?;
        berthing_active(b, b.version)?
            .insert(&txn)
            .await
            .map_err(db_err)?;
        if !b.cargo_details.is_empty() {
            let items = b
                .cargo_details
                .iter()
                .enumerate()
                .map(|(i, c)| cargo_active(c, &b.id, i))
                .collect::<DomainResult<Vec<_>>>()?;
            cargo_item::Entity::insert_many(items)
                .exec(&txn)
                .await
                .map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn save_transition(&self, b: &Berthing, claim: DockClaim) -> DomainResult<i64> {
        let next_version = b.version + 1;
        let txn = self.db.begin().await.map_err(db_err)?;

        let mut model = berthing_active(b, next_version)?;
        model.id = NotSet;
        model.created_by = NotSet;
        model.created_at = NotSet;
        let result = berthing::Entity::update_many()
            .set(model)
            .filter(berthing::Column::Id.eq(b.id.as_str()))
            .filter(berthing::Column::Version.eq(b.version))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(stale(b));
        }

        apply_dock_claim(&txn, &b.dock_id, claim).await?;
        txn.commit().await.map_err(db_err)?;
        debug!(berthing_id = %b.id, status = %b.status, version = next_version, "Berthing saved");
        Ok(next_version)
    }

    async fn save_cargo(&self, b: &Berthing, cargo: &CargoDetail) -> DomainResult<i64> {
        let position = b
            .cargo_details
            .iter()
            .position(|c| c.id == cargo.id)
            .ok_or_else(|| DomainError::not_found("Cargo", &cargo.id))?;
        let next_version = b.version + 1;
        let txn = self.db.begin().await.map_err(db_err)?;

        let result = berthing::Entity::update_many()
            .col_expr(berthing::Column::Version, Expr::value(next_version))
            .col_expr(berthing::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(berthing::Column::Id.eq(b.id.as_str()))
            .filter(berthing::Column::Version.eq(b.version))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(stale(b));
        }

        cargo_active(cargo, &b.id, position)?
            .update(&txn)
            .await
            .map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;
        Ok(next_version)
    }

    async fn delete(&self, b: &Berthing, claim: DockClaim) -> DomainResult<()> {
        let txn = self.db.begin().await.map_err(db_err)?;

        cargo_item::Entity::delete_many()
            .filter(cargo_item::Column::BerthingId.eq(b.id.as_str()))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        let result = berthing::Entity::delete_many()
            .filter(berthing::Column::Id.eq(b.id.as_str()))
            .filter(berthing::Column::Version.eq(b.version))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(stale(b));
        }

        apply_dock_claim(&txn, &b.dock_id, claim).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Berthing>> {
        let model = berthing::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        match model {
            Some(m) => Ok(self.hydrate(vec![m]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_by_cargo_id(&self, cargo_id: &str) -> DomainResult<Option<Berthing>> {
        let item = cargo_item::Entity::find_by_id(cargo_id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        match item {
            Some(item) => self.find_by_id(&item.berthing_id).await,
            None => Ok(None),
        }
    }

    async fn find_all(
        &self,
        filter: &BerthingFilter,
        page: PaginationParams,
    ) -> DomainResult<PaginatedResult<Berthing>> {
        let query = Self::filtered(filter).order_by_desc(berthing::Column::CreatedAt);
        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let models = query
            .offset(page.offset())
            .limit(page.limit as u64)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        let items = self.hydrate(models).await?;
        Ok(PaginatedResult::new(items, total, page.page, page.limit))
    }

    async fn find_in_statuses(&self, statuses: &[BerthingStatus]) -> DomainResult<Vec<Berthing>> {
        let statuses: Vec<&str> = statuses.iter().map(|s| s.as_str()).collect();
        let models = berthing::Entity::find()
            .filter(berthing::Column::Status.is_in(statuses))
            .order_by_asc(berthing::Column::ArrivalDate)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        self.hydrate(models).await
    }
}

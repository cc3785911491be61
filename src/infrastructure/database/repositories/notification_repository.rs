//! SeaORM implementation of NotificationRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};

use super::{db_err, parse_column};
use crate::domain::{
    DomainError, DomainResult, Notification, NotificationFilter, NotificationRepository,
    RelatedDocument,
};
use crate::infrastructure::database::entities::notification;
use crate::shared::{PaginatedResult, PaginationParams};

pub struct SeaOrmNotificationRepository {
    db: DatabaseConnection,
}

impl SeaOrmNotificationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: notification::Model) -> DomainResult<Notification> {
    let related = match (m.related_kind, m.related_id) {
        (Some(kind), Some(id)) => RelatedDocument::from_parts(&kind, id),
        _ => None,
    };
    Ok(Notification {
        notification_type: parse_column(&m.notification_type, "notifications.notification_type")?,
        id: m.id,
        user_id: m.user_id,
        title: m.title,
        message: m.message,
        read: m.read,
        read_at: m.read_at,
        related,
        action_url: m.action_url,
        created_at: m.created_at,
    })
}

fn for_user(user_id: &str) -> Select<notification::Entity> {
    notification::Entity::find().filter(notification::Column::UserId.eq(user_id))
}

#[async_trait]
impl NotificationRepository for SeaOrmNotificationRepository {
    async fn insert(&self, n: &Notification) -> DomainResult<()> {
        let model = notification::ActiveModel {
            id: Set(n.id.clone()),
            user_id: Set(n.user_id.clone()),
            title: Set(n.title.clone()),
            message: Set(n.message.clone()),
            notification_type: Set(n.notification_type.as_str().to_string()),
            read: Set(n.read),
            read_at: Set(n.read_at),
            related_kind: Set(n.related.as_ref().map(|r| r.kind().to_string())),
            related_id: Set(n.related.as_ref().map(|r| r.id().to_string())),
            action_url: Set(n.action_url.clone()),
            created_at: Set(n.created_at),
        };
        model.insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Notification>> {
        notification::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_for_user(
        &self,
        user_id: &str,
        filter: &NotificationFilter,
        page: PaginationParams,
    ) -> DomainResult<PaginatedResult<Notification>> {
        let mut query = for_user(user_id).order_by_desc(notification::Column::CreatedAt);
        if let Some(read) = filter.read {
            query = query.filter(notification::Column::Read.eq(read));
        }
        if let Some(kind) = filter.notification_type {
            query = query.filter(notification::Column::NotificationType.eq(kind.as_str()));
        }

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

    async fn count_unread(&self, user_id: &str) -> DomainResult<u64> {
        for_user(user_id)
            .filter(notification::Column::Read.eq(false))
            .count(&self.db)
            .await
            .map_err(db_err)
    }

    async fn mark_read(&self, id: &str) -> DomainResult<Notification> {
        notification::Entity::update_many()
            .col_expr(notification::Column::Read, Expr::value(true))
            .col_expr(notification::Column::ReadAt, Expr::value(Utc::now()))
            .filter(notification::Column::Id.eq(id))
            .filter(notification::Column::Read.eq(false))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Notification", id))
    }

    async fn mark_all_read(&self, user_id: &str) -> DomainResult<u64> {
        let result = notification::Entity::update_many()
            .col_expr(notification::Column::Read, Expr::value(true))
            .col_expr(notification::Column::ReadAt, Expr::value(Utc::now()))
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::Read.eq(false))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected)
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let result = notification::Entity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Notification", id));
        }
        Ok(())
    }

    async fn delete_read(&self, user_id: &str) -> DomainResult<u64> {
        let result = notification::Entity::delete_many()
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::Read.eq(true))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected)
    }
}

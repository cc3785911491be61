//! SeaORM implementation of UserRepository

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::debug;

use super::{db_err, parse_column};
use crate::domain::{DomainResult, User, UserRepository, UserRole};
use crate::infrastructure::database::entities::user;

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: user::Model) -> DomainResult<User> {
    Ok(User {
        role: parse_column(&m.role, "users.role")?,
        id: m.id,
        username: m.username,
        email: m.email,
        is_active: m.is_active,
        created_at: m.created_at,
    })
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn save(&self, u: User) -> DomainResult<()> {
        debug!(user_id = %u.id, "Saving user");

        let model = user::ActiveModel {
            id: Set(u.id),
            username: Set(u.username),
            email: Set(u.email),
            role: Set(u.role.as_str().to_string()),
            is_active: Set(u.is_active),
            created_at: Set(u.created_at),
        };
        user::Entity::insert(model)
            .on_conflict(
                OnConflict::column(user::Column::Id)
                    .update_columns([
                        user::Column::Username,
                        user::Column::Email,
                        user::Column::Role,
                        user::Column::IsActive,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        user::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_active_by_roles(&self, roles: &[UserRole]) -> DomainResult<Vec<User>> {
        let roles: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
        user::Entity::find()
            .filter(user::Column::IsActive.eq(true))
            .filter(user::Column::Role.is_in(roles))
            .order_by_asc(user::Column::Username)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }
}

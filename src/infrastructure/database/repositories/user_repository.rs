use sea_orm::{
    sea_query::OnConflict, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    QueryResult, Set,
};

use crate::domain::{User, UserRole};
use crate::infrastructure::database::entities::user;
use crate::infrastructure::database::list_source::{SqlListEntity, SqlListSource};
use crate::shared::{ConversionError, ListResult, QueryError};

const ENTITY: &str = "users";

pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// List source over the same connection.
    pub fn list_source(&self) -> SqlListSource<User> {
        SqlListSource::new(self.db.clone())
    }

    /// Inserts the user or overwrites the row with the same id.
    pub async fn save(&self, user: &User) -> ListResult<()> {
        save_user(&self.db, user).await
    }

    pub async fn find_by_id(&self, id: &str) -> ListResult<Option<User>> {
        let model = user::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| QueryError::store(ENTITY, e))?;
        Ok(model.map(user_model_to_domain))
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn entity_role_to_domain(role: user::UserRole) -> UserRole {
    match role {
        user::UserRole::Admin => UserRole::Admin,
        user::UserRole::Operator => UserRole::Operator,
        user::UserRole::Viewer => UserRole::Viewer,
    }
}

fn domain_role_to_entity(role: UserRole) -> user::UserRole {
    match role {
        UserRole::Admin => user::UserRole::Admin,
        UserRole::Operator => user::UserRole::Operator,
        UserRole::Viewer => user::UserRole::Viewer,
    }
}

fn user_model_to_domain(model: user::Model) -> User {
    User {
        id: model.id,
        username: model.username,
        email: model.email,
        role: entity_role_to_domain(model.role),
        is_active: model.is_active,
        date_created: model.date_created,
        last_login_at: model.last_login_at,
    }
}

fn user_to_active_model(user: &User) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(user.id.clone()),
        username: Set(user.username.clone()),
        email: Set(user.email.clone()),
        role: Set(domain_role_to_entity(user.role)),
        is_active: Set(user.is_active),
        date_created: Set(user.date_created),
        last_login_at: Set(user.last_login_at),
    }
}

pub async fn save_user<C: ConnectionTrait>(conn: &C, user: &User) -> ListResult<()> {
    user::Entity::insert(user_to_active_model(user))
        .on_conflict(
            OnConflict::column(user::Column::Id)
                .update_columns([
                    user::Column::Username,
                    user::Column::Email,
                    user::Column::Role,
                    user::Column::IsActive,
                    user::Column::DateCreated,
                    user::Column::LastLoginAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await
        .map_err(|e| QueryError::store(ENTITY, e))?;
    Ok(())
}

impl SqlListEntity for User {
    fn from_row(row: &QueryResult) -> Result<Self, ConversionError> {
        user::Model::from_query_result(row, "")
            .map(user_model_to_domain)
            .map_err(|e| ConversionError::new(ENTITY, e))
    }
}

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;

use crate::auth::domain::{AuthUser, NewUser};
use crate::auth::errors::AuthError;
use crate::auth::repository::UserRepository;
use models::errors::ModelError;

pub struct SeaOrmUserRepository {
    pub db: DatabaseConnection,
}

fn to_auth_user(m: models::user::Model) -> AuthUser {
    let created_at: DateTime<Utc> = m.created_at.into();
    AuthUser {
        id: m.id,
        first_name: m.first_name,
        last_name: m.last_name,
        email: m.email,
        password_hash: m.password_hash,
        verified: m.verified,
        created_at,
    }
}

fn map_err(e: ModelError) -> AuthError {
    match e {
        // unique constraint hit at insert time
        ModelError::Conflict(_) => AuthError::DuplicateEmail,
        other => AuthError::Storage(other.to_string()),
    }
}

#[async_trait::async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::find_by_email(&self.db, email)
            .await
            .map_err(map_err)?;
        Ok(res.map(to_auth_user))
    }

    async fn add(&self, new: NewUser) -> Result<AuthUser, AuthError> {
        let created = models::user::create(
            &self.db,
            models::user::NewUser {
                id: None,
                first_name: new.first_name,
                last_name: new.last_name,
                email: new.email,
                password_hash: new.password_hash,
                verified: new.verified,
                created_at: new.created_at,
            },
        )
        .await
        .map_err(map_err)?;
        Ok(to_auth_user(created))
    }
}

use sea_orm::{entity::prelude::*, DatabaseConnection, Set, SqlErr};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub verified: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Insert payload; id is assigned here when the caller leaves it unset.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Uniqueness and lookup both operate on the trimmed, lowercased form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

pub fn validate_email(email: &str) -> Result<(), errors::ModelError> {
    if !email.contains('@') {
        return Err(errors::ModelError::Validation("invalid email".into()));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() {
        return Err(errors::ModelError::Validation("name required".into()));
    }
    Ok(())
}

pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::Email.eq(normalize_email(email)))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

// Input validation happens at the HTTP boundary; the store only enforces
// the uniqueness constraint.
pub async fn create(db: &DatabaseConnection, new: NewUser) -> Result<Model, errors::ModelError> {
    let am = ActiveModel {
        id: Set(new.id.unwrap_or_else(Uuid::new_v4)),
        first_name: Set(new.first_name),
        last_name: Set(new.last_name),
        email: Set(normalize_email(&new.email)),
        password_hash: Set(new.password_hash),
        verified: Set(new.verified),
        created_at: Set(new.created_at.into()),
    };
    am.insert(db).await.map_err(|e| match e.sql_err() {
        // The unique constraint is the real arbiter of email uniqueness
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            errors::ModelError::Conflict("email already exists".into())
        }
        _ => errors::ModelError::Db(e.to_string()),
    })
}

pub async fn hard_delete(db: &DatabaseConnection, id: Uuid) -> Result<(), errors::ModelError> {
    Entity::delete_by_id(id)
        .exec(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  Ana@X.Com "), "ana@x.com");
        assert_eq!(normalize_email("ana@x.com"), "ana@x.com");
    }

    #[test]
    fn validate_email_requires_at_sign() {
        assert!(validate_email("ana@x.com").is_ok());
        assert!(validate_email("ana.x.com").is_err());
    }

    #[test]
    fn validate_name_rejects_blank() {
        assert!(validate_name("Ana").is_ok());
        assert!(validate_name("   ").is_err());
    }
}

//! Users: the credential store.
//!
//! The stored email is normalized (see [`normalize_email`]) and the password
//! only ever exists as a bcrypt hash. [`User`] is the public view and has no
//! field for the hash.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn new_user(
        id: Uuid,
        name: String,
        email: String,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ActiveValue::Set(id.to_string()),
            name: ActiveValue::Set(name),
            email: ActiveValue::Set(email),
            password_hash: ActiveValue::Set(password_hash),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
    }
}

impl TryFrom<Model> for User {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "user")?,
            name: model.name,
            email: model.email,
            created_at: model.created_at,
        })
    }
}

/// Canonical form used for storage and lookups: trimmed, NFKC, lowercase.
pub(crate) fn normalize_email(raw: &str) -> String {
    raw.trim().nfkc().collect::<String>().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_case_insensitive() {
        assert_eq!(normalize_email("  Ana@X.com "), "ana@x.com");
    }

    #[test]
    fn email_compatibility_forms_collapse() {
        // Fullwidth "Ａ" folds to "a".
        assert_eq!(normalize_email("\u{FF21}na@x.com"), "ana@x.com");
    }
}

//! Expenses: the expense store.
//!
//! `(user_id, idempotency_key)` is backed by a unique index; rows without a
//! key never collide with each other.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, Money, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: Money,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a create call.
///
/// `replayed` is `true` when the idempotency key matched an expense that
/// already existed; `expense` is then that stored record, unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedExpense {
    pub expense: Expense,
    pub replayed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    /// Normalized decimal text, e.g. `12.5`.
    pub amount: String,
    pub category: String,
    pub description: String,
    pub date: Date,
    pub idempotency_key: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            user_id: ActiveValue::Set(expense.user_id.to_string()),
            amount: ActiveValue::Set(expense.amount.to_string()),
            category: ActiveValue::Set(expense.category.clone()),
            description: ActiveValue::Set(expense.description.clone()),
            date: ActiveValue::Set(expense.date),
            idempotency_key: ActiveValue::Set(expense.idempotency_key.clone()),
            created_at: ActiveValue::Set(expense.created_at),
            updated_at: ActiveValue::Set(expense.updated_at),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "expense")?,
            user_id: parse_uuid(&model.user_id, "user")?,
            amount: parse_amount(&model.amount)?,
            category: model.category,
            description: model.description,
            date: model.date,
            idempotency_key: model.idempotency_key,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

fn parse_amount(stored: &str) -> Result<Money, EngineError> {
    stored
        .parse()
        .map_err(|_| EngineError::Internal(format!("invalid stored amount: {stored}")))
}

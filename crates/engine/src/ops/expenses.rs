use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{Order, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    CreatedExpense, EngineError, Expense, ExpenseCmd, ExpenseListFilter, Money, ResultEngine,
    SortOrder, expenses,
    validation::{NewExpense, validate_expense},
};

use super::Engine;

/// Spending for one category.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Money,
    pub count: u64,
    /// Percentage of the grand total, `0..=100`.
    pub share: f64,
}

/// Category breakdown of a user's expenses.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpenseSummary {
    pub total: Money,
    pub count: u64,
    /// Ordered by total descending, ties by category name.
    pub categories: Vec<CategoryTotal>,
}

impl Engine {
    /// Create an expense, honoring the optional idempotency key.
    ///
    /// With a key, at most one expense is ever persisted per
    /// `(user, key)`: a retry returns the stored record with
    /// `replayed = true`. Two concurrent creates with the same key can both
    /// miss the lookup; the loser hits the unique index and returns the
    /// winner's record instead of failing.
    pub async fn create_expense(&self, cmd: ExpenseCmd) -> ResultEngine<CreatedExpense> {
        let new = validate_expense(cmd)?;

        if let Some(key) = new.idempotency_key.as_deref()
            && let Some(existing) = self.expense_by_idempotency_key(new.user_id, key).await?
        {
            tracing::debug!(expense_id = %existing.id, "idempotent replay");
            return Ok(CreatedExpense {
                expense: existing,
                replayed: true,
            });
        }

        self.insert_expense(new).await
    }

    /// Insert step of [`Engine::create_expense`], including the recovery
    /// from a unique-index collision on the idempotency key.
    async fn insert_expense(&self, new: NewExpense) -> ResultEngine<CreatedExpense> {
        let now = Utc::now();
        let expense = Expense {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            amount: new.amount,
            category: new.category,
            description: new.description,
            date: new.date,
            idempotency_key: new.idempotency_key,
            created_at: now,
            updated_at: now,
        };

        match expenses::ActiveModel::from(&expense)
            .insert(&self.database)
            .await
            .map_err(EngineError::from_write)
        {
            Ok(model) => {
                tracing::debug!(expense_id = %expense.id, "expense created");
                Ok(CreatedExpense {
                    expense: Expense::try_from(model)?,
                    replayed: false,
                })
            }
            Err(EngineError::DuplicateKey(detail)) => {
                if let Some(key) = expense.idempotency_key.as_deref()
                    && let Some(existing) =
                        self.expense_by_idempotency_key(expense.user_id, key).await?
                {
                    tracing::debug!(expense_id = %existing.id, "idempotency key collision resolved");
                    return Ok(CreatedExpense {
                        expense: existing,
                        replayed: true,
                    });
                }
                Err(EngineError::DuplicateKey(detail))
            }
            Err(err) => Err(err),
        }
    }

    /// List a user's expenses, filtered and sorted.
    ///
    /// Ordering is by date, then creation time, then id, all in the
    /// direction given by `filter.sort`.
    pub async fn list_expenses(
        &self,
        user_id: Uuid,
        filter: &ExpenseListFilter,
    ) -> ResultEngine<Vec<Expense>> {
        let order = match filter.sort {
            SortOrder::DateDesc => Order::Desc,
            SortOrder::DateAsc => Order::Asc,
        };

        let mut query =
            expenses::Entity::find().filter(expenses::Column::UserId.eq(user_id.to_string()));
        if let Some(category) = filter.category.as_deref().filter(|c| !c.is_empty()) {
            query = query.filter(expenses::Column::Category.eq(category));
        }

        query
            .order_by(expenses::Column::Date, order.clone())
            .order_by(expenses::Column::CreatedAt, order.clone())
            .order_by(expenses::Column::Id, order)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Expense::try_from)
            .collect()
    }

    /// Per-category totals of a user's expenses. The category filter of
    /// `filter` applies; its sort order does not.
    pub async fn expense_summary(
        &self,
        user_id: Uuid,
        filter: &ExpenseListFilter,
    ) -> ResultEngine<ExpenseSummary> {
        let expenses = self.list_expenses(user_id, filter).await?;
        Ok(summarize(&expenses))
    }

    async fn expense_by_idempotency_key(
        &self,
        user_id: Uuid,
        key: &str,
    ) -> ResultEngine<Option<Expense>> {
        expenses::Entity::find()
            .filter(expenses::Column::UserId.eq(user_id.to_string()))
            .filter(expenses::Column::IdempotencyKey.eq(key))
            .one(&self.database)
            .await?
            .map(Expense::try_from)
            .transpose()
    }
}

fn summarize(expenses: &[Expense]) -> ExpenseSummary {
    let mut by_category: HashMap<&str, (Money, u64)> = HashMap::new();
    let mut total = Money::ZERO;

    for expense in expenses {
        let entry = by_category
            .entry(expense.category.as_str())
            .or_insert((Money::ZERO, 0));
        entry.0 = entry.0.checked_add(expense.amount).unwrap_or(entry.0);
        entry.1 += 1;
        total = total.checked_add(expense.amount).unwrap_or(total);
    }

    let mut categories: Vec<CategoryTotal> = by_category
        .into_iter()
        .map(|(category, (amount, count))| CategoryTotal {
            category: category.to_string(),
            total: amount,
            count,
            share: amount.percent_of(total),
        })
        .collect();
    categories.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
    });

    ExpenseSummary {
        total,
        count: expenses.len() as u64,
        categories,
    }
}

//! Expense API endpoints
//!
//! Every handler here sits behind the bearer middleware and scopes its engine
//! call to the authenticated [`AuthUser`].

use api_types::expense::{
    CategoryTotal, ExpenseListQuery, ExpenseNew, ExpenseSummary, ExpenseSummaryQuery, ExpenseView,
};
use axum::{
    Extension, Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use engine::{Expense, ExpenseCmd, ExpenseListFilter, InputValue, SortOrder};
use serde_json::Value;

use crate::{ServerError, server::AuthUser, server::ServerState};

fn input(value: Option<Value>) -> InputValue {
    match value {
        None => InputValue::Missing,
        Some(Value::Null) => InputValue::Null,
        Some(Value::String(text)) => InputValue::Text(text),
        Some(Value::Number(number)) => InputValue::Number(number.to_string()),
        Some(_) => InputValue::Other,
    }
}

fn expense_view(expense: Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        amount: expense.amount.to_f64(),
        category: expense.category,
        description: expense.description,
        date: expense.date,
        created_at: expense.created_at,
        updated_at: expense.updated_at,
    }
}

/// Handle requests for creating a new expense.
///
/// Answers `201` for a new record and `200` when the idempotency key matched
/// one that already exists.
pub async fn create(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    payload: Result<Json<ExpenseNew>, JsonRejection>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let Json(payload) = payload?;
    let cmd = ExpenseCmd::new(
        user_id,
        input(payload.amount),
        input(payload.category),
        input(payload.date),
    )
    .description(input(payload.description))
    .idempotency_key(input(payload.idempotency_key));

    let created = state.engine.create_expense(cmd).await?;
    let status = if created.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    Ok((status, Json(expense_view(created.expense))))
}

pub async fn list(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    query: Result<Query<ExpenseListQuery>, QueryRejection>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let Query(query) = query?;
    let filter = ExpenseListFilter {
        category: query.category,
        sort: SortOrder::from_param(query.sort.as_deref()),
    };

    let expenses = state.engine.list_expenses(user_id, &filter).await?;
    Ok(Json(expenses.into_iter().map(expense_view).collect()))
}

pub async fn summary(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    query: Result<Query<ExpenseSummaryQuery>, QueryRejection>,
) -> Result<Json<ExpenseSummary>, ServerError> {
    let Query(query) = query?;
    let filter = ExpenseListFilter {
        category: query.category,
        ..Default::default()
    };

    let summary = state.engine.expense_summary(user_id, &filter).await?;
    Ok(Json(ExpenseSummary {
        total: summary.total.to_f64(),
        count: summary.count,
        categories: summary
            .categories
            .into_iter()
            .map(|c| CategoryTotal {
                category: c.category,
                total: c.total.to_f64(),
                count: c.count,
                share: c.share,
            })
            .collect(),
    }))
}

//! Input validation.
//!
//! Runs before any storage access. Every rule is checked and all violations
//! end up in a single [`EngineError::Validation`] message.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::{EngineError, ExpenseCmd, InputValue, Money, ResultEngine};

pub(crate) const MIN_PASSWORD_LEN: usize = 6;

/// An expense submission that passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct NewExpense {
    pub user_id: Uuid,
    pub amount: Money,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
    pub idempotency_key: Option<String>,
}

/// Registration input that passed validation. The email is not normalized
/// yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

pub(crate) fn validate_expense(cmd: ExpenseCmd) -> ResultEngine<NewExpense> {
    let mut errors = Vec::new();

    let amount = match &cmd.amount {
        value if value.is_blank() => {
            errors.push("Amount is required");
            None
        }
        InputValue::Text(raw) | InputValue::Number(raw) => {
            match raw.parse::<Money>().ok().filter(|m| m.is_positive()) {
                Some(amount) => Some(amount),
                None => {
                    errors.push("Amount must be a positive number");
                    None
                }
            }
        }
        _ => {
            errors.push("Amount must be a positive number");
            None
        }
    };

    let category = match &cmd.category {
        value if value.is_blank() => {
            errors.push("Category is required");
            None
        }
        InputValue::Text(raw) => Some(raw.trim().to_string()),
        _ => {
            errors.push("Category must be a string");
            None
        }
    };

    let description = match &cmd.description {
        InputValue::Missing | InputValue::Null => String::new(),
        InputValue::Text(raw) => raw.trim().to_string(),
        _ => {
            errors.push("Description must be a string");
            String::new()
        }
    };

    let date = match &cmd.date {
        value if value.is_blank() => {
            errors.push("Date is required");
            None
        }
        InputValue::Text(raw) => match parse_date(raw) {
            Some(date) => Some(date),
            None => {
                errors.push("Date must be a valid date");
                None
            }
        },
        _ => {
            errors.push("Date must be a valid date");
            None
        }
    };

    let idempotency_key = match cmd.idempotency_key {
        InputValue::Missing | InputValue::Null => None,
        InputValue::Text(key) if key.is_empty() => None,
        InputValue::Text(key) => Some(key),
        _ => {
            errors.push("Idempotency key must be a string");
            None
        }
    };

    if let Some(err) = EngineError::validation(errors) {
        return Err(err);
    }

    match (amount, category, date) {
        (Some(amount), Some(category), Some(date)) => Ok(NewExpense {
            user_id: cmd.user_id,
            amount,
            category,
            description,
            date,
            idempotency_key,
        }),
        _ => Err(EngineError::Internal(
            "expense validation left a field unset".to_string(),
        )),
    }
}

/// Accepts an ISO 8601 calendar date, optionally followed by a time with or
/// without an offset. The date is taken as written; offsets never shift it.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|dt| dt.date())
        })
}

pub(crate) fn validate_registration<'a>(
    name: &'a str,
    email: &'a str,
    password: &'a str,
) -> ResultEngine<NewUser<'a>> {
    let mut errors = Vec::new();
    let name = name.trim();
    let email = email.trim();

    if name.is_empty() {
        errors.push("Name is required");
    }
    if email.is_empty() {
        errors.push("Email is required");
    }
    if password.is_empty() {
        errors.push("Password is required");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push("Password must be at least 6 characters");
    }

    match EngineError::validation(errors) {
        Some(err) => Err(err),
        None => Ok(NewUser {
            name,
            email,
            password,
        }),
    }
}

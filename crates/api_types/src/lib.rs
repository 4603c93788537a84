//! Wire contract of the HTTP API.
//!
//! Field names follow what the web client sends and expects (`idempotencyKey`,
//! `created_at`), so a few structs mix naming conventions on purpose.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod user {
    use super::*;

    /// `POST /auth/register` body.
    ///
    /// Every field is optional at the wire level so that missing fields turn
    /// into a validation message instead of a deserialization failure.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct Register {
        pub name: Option<String>,
        pub email: Option<String>,
        pub password: Option<String>,
    }

    /// `POST /auth/login` body.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct Login {
        pub email: Option<String>,
        pub password: Option<String>,
    }

    /// Public view of a user. Never carries the password hash.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub name: String,
        pub email: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuthResponse {
        pub token: String,
        pub user: UserView,
    }
}

pub mod expense {
    use super::*;

    /// `POST /expenses` body.
    ///
    /// Kept as raw JSON values: the amount may arrive as a number or a
    /// string, and type mismatches are reported together with the other
    /// validation messages.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub amount: Option<serde_json::Value>,
        pub category: Option<serde_json::Value>,
        pub description: Option<serde_json::Value>,
        pub date: Option<serde_json::Value>,
        /// Optional idempotency key for safely retrying the same create request.
        #[serde(rename = "idempotencyKey", alias = "idempotency_key")]
        pub idempotency_key: Option<serde_json::Value>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub amount: f64,
        pub category: String,
        pub description: String,
        /// Calendar date, `YYYY-MM-DD`.
        pub date: NaiveDate,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    /// Query string of `GET /expenses`.
    ///
    /// `sort` is `date_desc` (default) or `date_asc`; anything else falls
    /// back to the default.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseListQuery {
        pub category: Option<String>,
        pub sort: Option<String>,
    }

    /// Query string of `GET /expenses/summary`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseSummaryQuery {
        pub category: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct CategoryTotal {
        pub category: String,
        pub total: f64,
        pub count: u64,
        /// Percentage of the grand total, `0..=100`.
        pub share: f64,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ExpenseSummary {
        pub total: f64,
        pub count: u64,
        /// Ordered by total, largest first.
        pub categories: Vec<CategoryTotal>,
    }
}

pub mod health {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Health {
        pub status: String,
        pub timestamp: DateTime<Utc>,
    }
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

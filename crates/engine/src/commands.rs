//! Command structs for engine operations.
//!
//! Expense submissions arrive loosely typed from clients, so the command
//! carries [`InputValue`]s and validation happens inside the engine where
//! every broken rule can be reported at once.

use chrono::NaiveDate;
use uuid::Uuid;

/// A field as received from a client, before validation.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum InputValue {
    /// The field was not sent at all.
    #[default]
    Missing,
    /// The field was sent as an explicit `null`.
    Null,
    Text(String),
    /// A numeric literal, kept in its textual form to avoid float rounding.
    Number(String),
    /// Anything else (booleans, arrays, objects).
    Other,
}

impl InputValue {
    /// `true` for missing, null and blank text.
    pub(crate) fn is_blank(&self) -> bool {
        match self {
            Self::Missing | Self::Null => true,
            Self::Text(text) => text.trim().is_empty(),
            Self::Number(_) | Self::Other => false,
        }
    }
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for InputValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for InputValue {
    fn from(value: i64) -> Self {
        Self::Number(value.to_string())
    }
}

impl From<f64> for InputValue {
    fn from(value: f64) -> Self {
        Self::Number(value.to_string())
    }
}

impl From<NaiveDate> for InputValue {
    fn from(value: NaiveDate) -> Self {
        Self::Text(value.format("%Y-%m-%d").to_string())
    }
}

impl<T: Into<InputValue>> From<Option<T>> for InputValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Create an expense for `user_id`.
#[derive(Clone, Debug)]
pub struct ExpenseCmd {
    pub user_id: Uuid,
    pub amount: InputValue,
    pub category: InputValue,
    pub description: InputValue,
    pub date: InputValue,
    /// Optional idempotency key for safely retrying the same create request.
    pub idempotency_key: InputValue,
}

impl ExpenseCmd {
    #[must_use]
    pub fn new(
        user_id: Uuid,
        amount: impl Into<InputValue>,
        category: impl Into<InputValue>,
        date: impl Into<InputValue>,
    ) -> Self {
        Self {
            user_id,
            amount: amount.into(),
            category: category.into(),
            description: InputValue::Missing,
            date: date.into(),
            idempotency_key: InputValue::Missing,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<InputValue>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn idempotency_key(mut self, key: impl Into<InputValue>) -> Self {
        self.idempotency_key = key.into();
        self
    }
}

/// Sort order for listing expenses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Newest date first (default).
    #[default]
    DateDesc,
    DateAsc,
}

impl SortOrder {
    /// Parse the `sort` query parameter. Unknown values fall back to the
    /// default instead of failing.
    #[must_use]
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("date_asc") => Self::DateAsc,
            _ => Self::DateDesc,
        }
    }
}

/// Filters for listing and summarizing expenses.
#[derive(Clone, Debug, Default)]
pub struct ExpenseListFilter {
    /// Exact, case-sensitive category match. Empty means no filter.
    pub category: Option<String>,
    pub sort: SortOrder,
}

impl ExpenseListFilter {
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sort_falls_back_to_date_desc() {
        assert_eq!(SortOrder::from_param(None), SortOrder::DateDesc);
        assert_eq!(SortOrder::from_param(Some("date_asc")), SortOrder::DateAsc);
        assert_eq!(SortOrder::from_param(Some("date_desc")), SortOrder::DateDesc);
        assert_eq!(SortOrder::from_param(Some("amount")), SortOrder::DateDesc);
        assert_eq!(SortOrder::from_param(Some("DATE_ASC")), SortOrder::DateDesc);
    }

    #[test]
    fn blank_inputs() {
        assert!(InputValue::Missing.is_blank());
        assert!(InputValue::Null.is_blank());
        assert!(InputValue::from("  ").is_blank());
        assert!(!InputValue::from(0_i64).is_blank());
        assert!(!InputValue::Other.is_blank());
    }
}

//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when client input breaks one or more field rules.
//!   Every violated rule is listed in the message.
//! - [`Auth`] thrown for bad credentials and missing/invalid/expired tokens.
//! - [`Conflict`] thrown when registering an email that is already taken.
//! - [`DuplicateKey`] thrown when a write hits a unique index.
//! - [`Database`] for any other storage failure.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`Auth`]: EngineError::Auth
//!  [`Conflict`]: EngineError::Conflict
//!  [`DuplicateKey`]: EngineError::DuplicateKey
//!  [`Database`]: EngineError::Database
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Auth(String),
    #[error("{0}")]
    Conflict(String),
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
    #[error("internal error: {0}")]
    Internal(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Classify a failed write, splitting unique-index violations out of the
    /// generic storage errors.
    pub(crate) fn from_write(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => Self::DuplicateKey(detail),
            _ => Self::Database(err),
        }
    }

    /// Build a `Validation` error from the collected messages, if any.
    pub(crate) fn validation(messages: Vec<&'static str>) -> Option<Self> {
        if messages.is_empty() {
            None
        } else {
            Some(Self::Validation(messages.join(", ")))
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::Auth(a), Self::Auth(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::DuplicateKey(a), Self::DuplicateKey(b)) => a == b,
            (Self::Internal(a), Self::Internal(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_joins_messages() {
        let err = EngineError::validation(vec!["Amount is required", "Date is required"]);
        assert_eq!(
            err,
            Some(EngineError::Validation(
                "Amount is required, Date is required".to_string()
            ))
        );
    }

    #[test]
    fn validation_without_messages_is_none() {
        assert!(EngineError::validation(Vec::new()).is_none());
    }

    #[test]
    fn plain_db_errors_stay_database_errors() {
        let err = EngineError::from_write(DbErr::Custom("disk full".to_string()));
        assert!(matches!(err, EngineError::Database(_)));
    }
}

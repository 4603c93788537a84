//! Core of the expense tracker: users, bearer tokens and expenses.
//!
//! [`Engine`] owns the database handle. Callers identify themselves with an
//! explicit user id on every expense operation, obtained from
//! [`Engine::verify`].

pub use auth::{AuthConfig, DEFAULT_TOKEN_TTL_DAYS};
pub use commands::{ExpenseCmd, ExpenseListFilter, InputValue, SortOrder};
pub use error::EngineError;
pub use expenses::{CreatedExpense, Expense};
pub use money::Money;
pub use ops::{CategoryTotal, Engine, EngineBuilder, ExpenseSummary, Session};
pub use users::User;

mod auth;
mod commands;
mod error;
mod expenses;
mod money;
mod ops;
mod users;
mod util;
mod validation;

type ResultEngine<T> = Result<T, EngineError>;

use sea_orm::DatabaseConnection;

use crate::{
    ResultEngine,
    auth::{AuthConfig, TokenKeys},
};

mod expenses;
mod users;

pub use expenses::{CategoryTotal, ExpenseSummary};
pub use users::Session;

/// The expense tracker core: credential store, authentication and the
/// expense service, over one database handle.
///
/// Every operation that touches user data takes the caller's user id as an
/// explicit argument.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    tokens: TokenKeys,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Close the underlying database pool.
    pub async fn close(self) -> ResultEngine<()> {
        self.database.close().await?;
        Ok(())
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    auth: Option<AuthConfig>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Pass the token and password hashing settings
    pub fn auth(mut self, config: AuthConfig) -> EngineBuilder {
        self.auth = Some(config);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let config = self.auth.ok_or_else(|| {
            crate::EngineError::Internal("missing auth configuration".to_string())
        })?;
        Ok(Engine {
            database: self.database,
            tokens: TokenKeys::from_config(&config)?,
        })
    }
}

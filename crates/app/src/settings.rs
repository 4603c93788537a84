//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` in the working directory, then overridden by
//! `SPENDLOG__<SECTION>__<KEY>` environment variables.
//!
//! ```toml
//! database = { sqlite = "spendlog.db" }
//!
//! [app]
//! level = "info"
//!
//! [server]
//! bind = "127.0.0.1"
//! port = 5000
//! base_path = "/api"
//! allowed_origins = ["http://localhost:5173"]
//!
//! [auth]
//! jwt_secret = "change-me"
//! ```
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    pub base_path: String,
    pub allowed_origins: Vec<String>,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 5000,
            base_path: String::new(),
            allowed_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Default for Database {
    fn default() -> Self {
        Self::Sqlite("spendlog.db".to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub jwt_secret: String,
    pub token_ttl_days: Option<i64>,
    pub bcrypt_cost: Option<u32>,
}

impl Auth {
    pub fn to_config(&self) -> engine::AuthConfig {
        let mut config = engine::AuthConfig::new(self.jwt_secret.clone());
        if let Some(days) = self.token_ttl_days {
            config = config.token_ttl(chrono::Duration::days(days));
        }
        if let Some(cost) = self.bcrypt_cost {
            config = config.bcrypt_cost(cost);
        }
        config
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub database: Database,
    pub auth: Auth,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("SPENDLOG")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

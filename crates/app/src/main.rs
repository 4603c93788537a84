use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use settings::{Database, Settings};

mod settings;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const USAGE: &str = "usage: spendlog [serve | migrate [up|down|fresh|status]]";

/// What the binary was asked to do.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Serve,
    Migrate(MigrateStep),
}

#[derive(Debug, PartialEq, Eq)]
enum MigrateStep {
    Up,
    Down,
    Fresh,
    Status,
}

impl Command {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
        let command = match args.next().as_deref() {
            None | Some("serve") => Command::Serve,
            Some("migrate") => {
                let step = match args.next().as_deref() {
                    None | Some("up") => MigrateStep::Up,
                    Some("down") => MigrateStep::Down,
                    Some("fresh") => MigrateStep::Fresh,
                    Some("status") => MigrateStep::Status,
                    Some(other) => return Err(format!("unknown migrate step `{other}`\n{USAGE}")),
                };
                Command::Migrate(step)
            }
            Some(other) => return Err(format!("unknown command `{other}`\n{USAGE}")),
        };
        match args.next() {
            Some(extra) => Err(format!("unexpected argument `{extra}`\n{USAGE}")),
            None => Ok(command),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let command = Command::parse(std::env::args().skip(1))?;
    let settings = Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "spendlog={level},server={level},engine={level},tower_http={level},sea_orm_migration={level}",
            level = settings.app.level
        ))
        .init();

    match command {
        Command::Serve => serve(settings).await,
        Command::Migrate(step) => migrate(&settings.database, step).await,
    }
}

async fn serve(settings: Settings) -> Result<(), BoxError> {
    let db = connect(&settings.database).await?;
    Migrator::up(&db, None).await?;
    tracing::info!("database ready");

    let engine = engine::Engine::builder()
        .database(db)
        .auth(settings.auth.to_config())
        .build()
        .await?;

    let addr = format!("{}:{}", settings.server.bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let config = server::RouterConfig {
        base_path: settings.server.base_path,
        allowed_origins: settings.server.allowed_origins,
    };

    let engine = Arc::new(engine);
    let served =
        server::run_with_listener(Arc::clone(&engine), &config, listener, shutdown_signal()).await;
    shut_down(engine, served).await
}

/// Closes the database, then reports how serving ended.
async fn shut_down(
    engine: Arc<engine::Engine>,
    served: Result<(), std::io::Error>,
) -> Result<(), BoxError> {
    if let Err(err) = &served {
        tracing::error!("server failed: {err}");
    }

    match Arc::try_unwrap(engine) {
        Ok(engine) => engine.close().await?,
        Err(_) => tracing::warn!("engine still shared at shutdown, skipping database close"),
    }
    tracing::info!("shutdown complete");

    served?;
    Ok(())
}

async fn migrate(database: &Database, step: MigrateStep) -> Result<(), BoxError> {
    let db = connect(database).await?;
    match step {
        MigrateStep::Up => Migrator::up(&db, None).await?,
        MigrateStep::Down => Migrator::down(&db, None).await?,
        MigrateStep::Fresh => Migrator::fresh(&db).await?,
        MigrateStep::Status => Migrator::status(&db).await?,
    }
    tracing::info!("migrate {step:?} done");
    db.close().await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

async fn connect(config: &Database) -> Result<sea_orm::DatabaseConnection, BoxError> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    Ok(sea_orm::Database::connect(url).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, String> {
        Command::parse(args.iter().map(|arg| arg.to_string()))
    }

    async fn memory_engine() -> Arc<engine::Engine> {
        let db = connect(&Database::Memory).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let engine = engine::Engine::builder()
            .database(db)
            .auth(engine::AuthConfig::new("test-secret").bcrypt_cost(4))
            .build()
            .await
            .unwrap();
        Arc::new(engine)
    }

    #[test]
    fn serve_is_the_default_command() {
        assert_eq!(parse(&[]), Ok(Command::Serve));
        assert_eq!(parse(&["serve"]), Ok(Command::Serve));
    }

    #[test]
    fn migrate_steps() {
        assert_eq!(parse(&["migrate"]), Ok(Command::Migrate(MigrateStep::Up)));
        assert_eq!(parse(&["migrate", "down"]), Ok(Command::Migrate(MigrateStep::Down)));
        assert_eq!(parse(&["migrate", "fresh"]), Ok(Command::Migrate(MigrateStep::Fresh)));
        assert_eq!(parse(&["migrate", "status"]), Ok(Command::Migrate(MigrateStep::Status)));
    }

    #[test]
    fn unknown_arguments_are_rejected() {
        assert!(parse(&["launch"]).unwrap_err().contains("unknown command `launch`"));
        assert!(parse(&["migrate", "sideways"]).is_err());
        assert!(parse(&["serve", "now"]).unwrap_err().contains("unexpected argument"));
    }

    #[tokio::test]
    async fn migrate_runs_against_the_configured_database() {
        migrate(&Database::Memory, MigrateStep::Up).await.unwrap();
    }

    #[tokio::test]
    async fn server_failure_is_returned_after_shutdown() {
        let engine = memory_engine().await;
        let failure = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken");

        let err = shut_down(engine, Err(failure)).await.unwrap_err();
        assert_eq!(err.to_string(), "port taken");
    }

    #[tokio::test]
    async fn clean_shutdown_is_ok() {
        let engine = memory_engine().await;
        assert!(shut_down(engine, Ok(())).await.is_ok());
    }
}
